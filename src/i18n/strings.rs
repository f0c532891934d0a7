/// Localized labels used when rendering catalog views.
#[derive(Debug, Clone)]
pub struct LanguageStrings {
    // ==================== Currency Labels ====================
    /// Label for US dollar prices. The literal "USD" means "render with a $ glyph"
    /// in the primary language.
    pub price_usd: &'static str,

    /// Label for local-currency (Egyptian pound) prices
    pub price_egp: &'static str,

    // ==================== Catalog Messages ====================
    /// Shown on the favorites page when nothing has been saved
    pub no_favorites: &'static str,

    /// Shown on the details page for an unknown product id
    pub product_not_found: &'static str,

    /// Heading for the featured listing on the home page
    pub featured_heading: &'static str,

    /// Heading for the inventory listing
    pub inventory_heading: &'static str,
}

// ==================== English Strings ====================

/// English language strings (primary)
pub const ENGLISH_STRINGS: LanguageStrings = LanguageStrings {
    price_usd: "USD",
    price_egp: "L.E",

    no_favorites: "You haven't added any favorites yet.",
    product_not_found: "Product not found",
    featured_heading: "Trending Now",
    inventory_heading: "Our Inventory",
};

// ==================== Arabic Strings ====================

/// Arabic language strings
pub const ARABIC_STRINGS: LanguageStrings = LanguageStrings {
    price_usd: "دولار",
    price_egp: "ج.م",

    no_favorites: "لم تقم بإضافة أي مفضلات بعد.",
    product_not_found: "المنتج غير موجود",
    featured_heading: "الأكثر رواجاً",
    inventory_heading: "معرض السيارات",
};
