//! Registered content categories.

use crate::provider::ContentProvider;

/// One registered content category: a name plus its capability pair.
///
/// The category set is fixed at startup (see
/// [`catalog::standard_categories`](crate::catalog::standard_categories));
/// registration order is the processing and reporting order.
pub struct Category {
    name: String,
    provider: Box<dyn ContentProvider>,
}

impl Category {
    pub fn new(name: impl Into<String>, provider: Box<dyn ContentProvider>) -> Self {
        Self {
            name: name.into(),
            provider,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn provider(&self) -> &dyn ContentProvider {
        self.provider.as_ref()
    }
}

impl std::fmt::Debug for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Category").field("name", &self.name).finish()
    }
}
