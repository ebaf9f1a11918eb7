use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Selectors {
    pub category_link: String,
    pub product_link: String,
    pub picture_image: String,
    pub price: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            category_link: ".nav .shirts a".into(),
            product_link: ".products li a".into(),
            picture_image: ".shirt-picture img".into(),
            price: "span.price".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub base_url: String,
    pub output_dir: PathBuf,
    pub error_log_name: String,
    pub selectors: Selectors,
    pub request_timeout: Duration,
    pub run_timeout: Duration,
    pub max_redirects: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "http://www.shirts4mike.com/".into(),
            output_dir: PathBuf::from("data"),
            error_log_name: "scraper-error.log".into(),
            selectors: Selectors::default(),
            request_timeout: Duration::from_secs(30),
            run_timeout: Duration::from_secs(600),
            max_redirects: 10,
        }
    }
}

impl ScraperConfig {
    pub fn error_log_path(&self) -> PathBuf {
        self.output_dir.join(&self.error_log_name)
    }
}
