pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Read a typed document from `--input`, falling back to piped stdin.
/// `Ok(None)` means neither was supplied.
pub fn read_document<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => file::read_json(path).map(Some),
        None => stdin::read_stdin(),
    }
}
