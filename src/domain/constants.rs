//! Site characteristics and extraction constant tables
//!
//! Every threshold, denylist and vocabulary used by the extraction pipeline
//! lives here so that call sites never carry their own copies. The tables are
//! versioned: bump [`VOCABULARY_VERSION`] whenever a table changes meaning.

/// Version of the denylist/vocabulary tables below
pub const VOCABULARY_VERSION: u32 = 3;

/// Target site characteristics
pub mod site {
    /// Default site root
    pub const BASE_URL: &str = "https://www.jumbo.com.ar";

    /// Token expected somewhere in every genuine page of the site
    pub const IDENTITY_TOKEN: &str = "jumbo";

    /// A real page of the site is never shorter than this
    pub const MIN_VALID_PAGE_CHARS: usize = 1000;

    /// Accept-Language sent with every request
    pub const ACCEPT_LANGUAGE: &str = "es-AR,es;q=0.9,en;q=0.8";

    pub const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

    pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
}

/// Fetch layer limits
pub mod fetch {
    /// Bodies shorter than this are treated as block pages and retried
    pub const MIN_CONTENT_CHARS: usize = 100;

    /// Redirect hops followed before giving up
    pub const MAX_REDIRECTS: usize = 10;

    pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
    pub const DEFAULT_MAX_RETRIES: u32 = 3;
    pub const DEFAULT_DELAY_SECONDS: f64 = 1.0;
}

/// Extraction thresholds
pub mod extraction {
    /// Inclusive character bounds for category names
    pub const CATEGORY_NAME_MIN_CHARS: usize = 3;
    pub const CATEGORY_NAME_MAX_CHARS: usize = 49;

    /// Inclusive character bounds for filter names
    pub const FILTER_NAME_MIN_CHARS: usize = 2;
    pub const FILTER_NAME_MAX_CHARS: usize = 49;

    /// Longer list items are prose, not facet names
    pub const FILTER_NAME_MAX_WORDS: usize = 5;

    /// Category container must hold at least this many qualifying links
    pub const MIN_CONTAINER_LINKS: usize = 8;

    /// Filter container must hold at least this much non-whitespace text
    pub const MIN_CONTAINER_TEXT_CHARS: usize = 10;

    /// Hard cap on filters per category, base filters included
    pub const MAX_FILTERS: usize = 50;

    /// Facet names assumed present on every category page, in output order
    pub const BASE_FILTERS: [&str; 3] = ["Category", "Sub-Category", "Product Type"];

    /// Spellings of the base filters found on the site; never emitted as discovered filters
    pub const BASE_FILTER_ALIASES: &[&str] = &[
        "category",
        "categoría",
        "categoria",
        "sub-category",
        "subcategory",
        "sub-categoría",
        "sub-categoria",
        "subcategoría",
        "subcategoria",
        "product type",
        "tipo de producto",
    ];
}

/// Named denylists and vocabularies
pub mod vocabulary {
    /// Path fragments of navigational, non-category links
    pub const NAVIGATION_PATH_DENYLIST: &[&str] = &[
        "login",
        "carrito",
        "checkout",
        "ofertas",
        "novedades",
        "ayuda",
        "contacto",
        "sucursales",
        "entrega",
        "actualiza",
        "descuentos",
        "mi-cuenta",
        "legales",
        "bancarios",
        "arrepentimiento",
    ];

    /// Link texts that betray calls to action rather than categories
    pub const LINK_TEXT_DENYLIST: &[&str] = &[
        "ver",
        "click",
        "comprar",
        "precio",
        "regular",
        "producto",
        "descuentos",
        "sucursal",
        "entrega",
        "actualiza",
        "legales",
        "bancarios",
    ];

    /// Known facet names, matched case-insensitively against whole text nodes
    pub const FACET_KEYWORDS: &[&str] = &[
        "Marca",
        "Tipo",
        "Contenido",
        "Envase",
        "Sabor",
        "Elaboración",
        "Origen",
        "Formato",
        "Variedad",
        "Cantidad",
        "Presentación",
        "Color",
        "Tamaño",
        "Capacidad",
        "Peso",
        "Potencia",
        "Garantía",
        "Brand",
        "Type",
        "Content",
        "Flavor",
        "Origin",
        "Format",
        "Size",
    ];

    /// Terms marking price ranges and checkout noise inside filter candidates
    pub const PRICE_TERM_DENYLIST: &[&str] = &[
        "precio",
        "impuestos",
        "nacionales",
        "limpiar",
        "filtrar",
    ];

    /// Prefixes of UI controls that sit next to facet titles
    pub const CONTROL_PREFIXES: &[&str] = &["Mostrar", "Ver", "Más", "+", "-"];
}
