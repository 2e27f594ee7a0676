//! Dependency tagging for backend calls.

/// What part of the backend a call depends on. Used in logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyTag {
    /// Products, categories and subcategories.
    Catalog,
    /// Blog posts, testimonials and FAQs.
    Content,
    Orders,
    Promo,
    Delivery,
    Contact,
}

impl DependencyTag {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Catalog => "catalog",
            Self::Content => "content",
            Self::Orders => "orders",
            Self::Promo => "promo",
            Self::Delivery => "delivery",
            Self::Contact => "contact",
        }
    }

    /// Whether a failure should fail the whole request rather than a section.
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Catalog | Self::Orders)
    }
}

impl std::fmt::Display for DependencyTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
