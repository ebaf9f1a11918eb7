use scraper::{ElementRef, Html, Selector};

use crate::config::Selectors;
use crate::error::{Result, ScrapeError};
use crate::models::RawProduct;

/// Compiled form of [`Selectors`], built once per run.
pub struct PageSelectors {
    category_link: (String, Selector),
    product_link: (String, Selector),
    picture_image: (String, Selector),
    price: (String, Selector),
}

fn compile(css: &str) -> Result<(String, Selector)> {
    let selector = Selector::parse(css).map_err(|e| ScrapeError::InvalidSelector {
        selector: css.to_string(),
        reason: e.to_string(),
    })?;
    Ok((css.to_string(), selector))
}

impl PageSelectors {
    pub fn compile(selectors: &Selectors) -> Result<Self> {
        Ok(Self {
            category_link: compile(&selectors.category_link)?,
            product_link: compile(&selectors.product_link)?,
            picture_image: compile(&selectors.picture_image)?,
            price: compile(&selectors.price)?,
        })
    }

    /// Hrefs of the category navigation links on the landing page.
    pub fn category_links(&self, page_url: &str, html: &str) -> Result<Vec<String>> {
        hrefs(page_url, html, &self.category_link)
    }

    /// Hrefs of the product anchors on a category page, as written in the markup.
    pub fn product_links(&self, page_url: &str, html: &str) -> Result<Vec<String>> {
        hrefs(page_url, html, &self.product_link)
    }

    pub fn product(&self, page_url: &str, relative_href: &str, html: &str) -> Result<RawProduct> {
        let doc = Html::parse_document(html);

        let (img_css, img_sel) = &self.picture_image;
        let img = first(&doc, page_url, img_css, img_sel)?;
        let title = attribute(img, page_url, img_css, "alt")?;
        let image_url = attribute(img, page_url, img_css, "src")?;

        let (price_css, price_sel) = &self.price;
        let price = first(&doc, page_url, price_css, price_sel)?
            .text()
            .collect::<String>()
            .trim()
            .to_string();

        Ok(RawProduct {
            title,
            price,
            image_url,
            relative_url: relative_href.to_string(),
        })
    }
}

fn hrefs(page_url: &str, html: &str, (css, selector): &(String, Selector)) -> Result<Vec<String>> {
    let doc = Html::parse_document(html);
    let links: Vec<String> = doc
        .select(selector)
        .filter_map(|a| a.value().attr("href"))
        .map(|href| href.trim().to_string())
        .collect();

    if links.is_empty() {
        return Err(ScrapeError::NoMatch {
            url: page_url.to_string(),
            selector: css.clone(),
        });
    }
    Ok(links)
}

fn first<'a>(doc: &'a Html, page_url: &str, css: &str, selector: &Selector) -> Result<ElementRef<'a>> {
    doc.select(selector).next().ok_or_else(|| ScrapeError::NoMatch {
        url: page_url.to_string(),
        selector: css.to_string(),
    })
}

fn attribute(el: ElementRef<'_>, page_url: &str, css: &str, name: &'static str) -> Result<String> {
    el.value()
        .attr(name)
        .map(str::to_string)
        .ok_or_else(|| ScrapeError::MissingAttribute {
            url: page_url.to_string(),
            selector: css.to_string(),
            attribute: name,
        })
}
