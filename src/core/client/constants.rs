//! Centralized constants for default endpoints and UA.

/// Default desktop UA to avoid trivial bot blocking.
pub(crate) const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (X11; Linux x86_64) ",
    "AppleWebKit/537.36 (KHTML, like Gecko) ",
    "Chrome/122.0.0.0 Safari/537.36"
);

/// Minute-bar price stream (`q`, `x`, `p`, `i` query parameters).
pub(crate) const DEFAULT_BASE_PRICES: &str = "http://www.google.com/finance/getprices";

/// Light snapshot endpoint, JSON behind a fixed preamble.
pub(crate) const DEFAULT_BASE_SNAPSHOT_LIGHT: &str = "http://www.google.com/finance/info";

/// Heavy snapshot endpoint, XML with one `finance` element per symbol.
pub(crate) const DEFAULT_BASE_SNAPSHOT_HEAVY: &str = "http://www.google.com/ig/api";

/// Field-query endpoint, one quoted CSV line per symbol.
pub(crate) const DEFAULT_BASE_QUOTES_CSV: &str = "http://finance.yahoo.com/d/quotes.csv";

/// Daily history CSV endpoint.
pub(crate) const DEFAULT_BASE_HISTORY: &str = "http://ichart.yahoo.com/table.csv";

/// Length of the non-JSON guard (`// `) the light endpoint prepends to its body.
pub(crate) const LIGHT_PREAMBLE_LEN: usize = 3;
