#[cfg(feature = "test-mode")]
use std::env;

/// Hook run on every fetched body.
/// In `test-mode`, if `QF_RECORD=1`, the body is saved as a fixture via `fixtures`.
pub(crate) fn capture(_body: &[u8], _endpoint: &str, _key: &str, _ext: &str) {
    #[cfg(feature = "test-mode")]
    {
        if env::var("QF_RECORD").ok().as_deref() == Some("1")
            && let Err(e) = crate::core::fixtures::record_fixture(_endpoint, _key, _ext, _body)
        {
            eprintln!("QF_RECORD: failed to write fixture for {_key}: {e}");
        }
    }
}
