use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Zentao {
    url: Option<String>,
}

impl Zentao {
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.trim().is_empty())
    }
}
