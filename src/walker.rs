use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::{Result, ScrapeError};
use crate::fetcher::Fetch;
use crate::models::{self, RawProduct};
use crate::parser::PageSelectors;

#[derive(Debug)]
pub enum WalkEvent {
    Product(RawProduct),
    Error(ScrapeError),
    /// Emitted exactly once, after every discovered link has been tried.
    Done,
}

/// Landing page -> category pages -> product pages, one fetch at a time.
pub struct SiteWalker<'a, F: Fetch> {
    fetcher: &'a F,
    selectors: &'a PageSelectors,
    run_timeout: Duration,
}

enum Flow {
    Continue,
    Stop,
}

impl<'a, F: Fetch> SiteWalker<'a, F> {
    pub fn new(fetcher: &'a F, selectors: &'a PageSelectors, run_timeout: Duration) -> Self {
        Self {
            fetcher,
            selectors,
            run_timeout,
        }
    }

    pub fn walk(&self, start_url: &str, mut emit: impl FnMut(WalkEvent)) {
        let started = Instant::now();
        self.walk_categories(start_url, started, &mut emit);
        emit(WalkEvent::Done);
    }

    fn walk_categories(&self, start_url: &str, started: Instant, emit: &mut impl FnMut(WalkEvent)) {
        let categories = match self
            .fetch(start_url, started)
            .and_then(|html| self.selectors.category_links(start_url, &html))
        {
            Ok(links) => links,
            Err(e) => return emit(WalkEvent::Error(e)),
        };
        info!(count = categories.len(), "category links found");

        for href in categories {
            let category_url = match models::resolve(start_url, &href) {
                Ok(u) => u,
                Err(e) => {
                    emit(WalkEvent::Error(e));
                    continue;
                }
            };
            if let Flow::Stop = self.walk_products(&category_url, started, emit) {
                return;
            }
        }
    }

    fn walk_products(&self, category_url: &str, started: Instant, emit: &mut impl FnMut(WalkEvent)) -> Flow {
        let products = match self
            .fetch(category_url, started)
            .and_then(|html| self.selectors.product_links(category_url, &html))
        {
            Ok(links) => links,
            Err(e) => return self.report(e, emit),
        };
        debug!(category = category_url, count = products.len(), "product links found");

        for href in products {
            let result = models::resolve(category_url, &href).and_then(|product_url| {
                let html = self.fetch(&product_url, started)?;
                self.selectors.product(&product_url, &href, &html)
            });
            match result {
                Ok(product) => emit(WalkEvent::Product(product)),
                Err(e) => {
                    if let Flow::Stop = self.report(e, emit) {
                        return Flow::Stop;
                    }
                }
            }
        }
        Flow::Continue
    }

    fn report(&self, e: ScrapeError, emit: &mut impl FnMut(WalkEvent)) -> Flow {
        let flow = match e {
            ScrapeError::RunTimeout { .. } => Flow::Stop,
            _ => Flow::Continue,
        };
        emit(WalkEvent::Error(e));
        flow
    }

    fn fetch(&self, url: &str, started: Instant) -> Result<String> {
        let elapsed = started.elapsed();
        if elapsed >= self.run_timeout {
            warn!(?elapsed, "run deadline passed, stopping traversal");
            return Err(ScrapeError::RunTimeout { elapsed });
        }
        self.fetcher.fetch_html(url)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::Selectors;
    use std::collections::HashMap;

    /// Serves canned HTML by URL; anything else is a 404.
    #[derive(Default)]
    pub(crate) struct StaticSite {
        pages: HashMap<String, String>,
    }

    impl StaticSite {
        pub(crate) fn page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }

        pub(crate) fn without(mut self, url: &str) -> Self {
            self.pages.remove(url);
            self
        }

        /// One category holding the given product ids, all pages well formed.
        pub(crate) fn shop(base: &str, ids: &[u32]) -> Self {
            Self::catalog(base, &[("shirts.php", ids)])
        }

        /// Categories in nav order, each with its product ids.
        pub(crate) fn catalog(base: &str, categories: &[(&str, &[u32])]) -> Self {
            let nav: String = categories
                .iter()
                .map(|(href, _)| format!(r#"<a href="{href}">{href}</a>"#))
                .collect();
            let mut site = StaticSite::default().page(
                &format!("{base}/"),
                &format!(r#"<ul class="nav"><li class="shirts">{nav}</li></ul>"#),
            );
            for (href, ids) in categories {
                let items: String = ids
                    .iter()
                    .map(|id| format!(r#"<li><a href="shirt.php?id={id}">#{id}</a></li>"#))
                    .collect();
                site = site.page(
                    &format!("{base}/{href}"),
                    &format!(r#"<ul class="products">{items}</ul>"#),
                );
                for id in *ids {
                    site = site.page(
                        &format!("{base}/shirt.php?id={id}"),
                        &format!(
                            r#"<div class="shirt-picture"><img src="img/shirts/shirt-{id}.jpg" alt="Shirt {id}"></div>
                               <span class="price">${id}</span>"#
                        ),
                    );
                }
            }
            site
        }
    }

    impl Fetch for StaticSite {
        fn fetch_html(&self, url: &str) -> Result<String> {
            self.pages.get(url).cloned().ok_or_else(|| ScrapeError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    fn collect(site: &StaticSite, start: &str, timeout: Duration) -> Vec<WalkEvent> {
        let selectors = PageSelectors::compile(&Selectors::default()).unwrap();
        let walker = SiteWalker::new(site, &selectors, timeout);
        let mut events = Vec::new();
        walker.walk(start, |e| events.push(e));
        events
    }

    const BASE: &str = "http://shop.test";

    #[test]
    fn walks_products_in_order_then_done() {
        let site = StaticSite::shop(BASE, &[101, 102]);
        let events = collect(&site, "http://shop.test/", Duration::from_secs(60));

        assert_eq!(events.len(), 3);
        match (&events[0], &events[1], &events[2]) {
            (WalkEvent::Product(a), WalkEvent::Product(b), WalkEvent::Done) => {
                assert_eq!(a.relative_url, "shirt.php?id=101");
                assert_eq!(a.title, "Shirt 101");
                assert_eq!(b.relative_url, "shirt.php?id=102");
                assert_eq!(b.price, "$102");
            }
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn base_page_failure_is_one_error_then_done() {
        let site = StaticSite::default();
        let events = collect(&site, "http://shop.test/", Duration::from_secs(60));

        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], WalkEvent::Error(ScrapeError::Status { status: 404, .. })));
        assert!(matches!(events[1], WalkEvent::Done));
    }

    #[test]
    fn broken_product_page_does_not_stop_the_walk() {
        let site = StaticSite::shop(BASE, &[101, 102])
            .page("http://shop.test/shirt.php?id=101", "<p>gone</p>");
        let events = collect(&site, "http://shop.test/", Duration::from_secs(60));

        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], WalkEvent::Error(ScrapeError::NoMatch { .. })));
        assert!(matches!(&events[1], WalkEvent::Product(p) if p.title == "Shirt 102"));
        assert!(matches!(events[2], WalkEvent::Done));
    }

    #[test]
    fn expired_deadline_stops_after_one_error() {
        let site = StaticSite::shop(BASE, &[101]);
        let events = collect(&site, "http://shop.test/", Duration::ZERO);

        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], WalkEvent::Error(ScrapeError::RunTimeout { .. })));
        assert!(matches!(events[1], WalkEvent::Done));
    }

    #[test]
    fn failed_category_is_skipped_and_order_kept() {
        let site = StaticSite::catalog(BASE, &[("a.php", &[1]), ("b.php", &[2]), ("c.php", &[3])])
            .without("http://shop.test/b.php");
        let events = collect(&site, "http://shop.test/", Duration::from_secs(60));

        assert_eq!(events.len(), 4, "{events:?}");
        assert!(matches!(&events[0], WalkEvent::Product(p) if p.title == "Shirt 1"));
        assert!(matches!(
            &events[1],
            WalkEvent::Error(ScrapeError::Status { url, status: 404 }) if url == "http://shop.test/b.php"
        ));
        assert!(matches!(&events[2], WalkEvent::Product(p) if p.title == "Shirt 3"));
        assert!(matches!(events[3], WalkEvent::Done));
    }

    #[test]
    fn empty_category_is_skipped() {
        let site = StaticSite::catalog(BASE, &[("a.php", &[]), ("c.php", &[3])]);
        let events = collect(&site, "http://shop.test/", Duration::from_secs(60));

        assert_eq!(events.len(), 3, "{events:?}");
        assert!(matches!(events[0], WalkEvent::Error(ScrapeError::NoMatch { .. })));
        assert!(matches!(&events[1], WalkEvent::Product(p) if p.title == "Shirt 3"));
        assert!(matches!(events[2], WalkEvent::Done));
    }
}
