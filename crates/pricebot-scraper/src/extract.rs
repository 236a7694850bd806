//! Product name and price extraction from product-page HTML.
//!
//! Extraction is table driven: each [`Field`] has an ordered list of CSS
//! selectors and the first one that yields non-empty text wins. Markup changes
//! on the retailer side are fixed by editing [`default_rules`], not the
//! extraction code.
//!
//! Price fragments are only ever combined within one price block, so a block
//! missing its fraction can never borrow one from another offer on the page.

use chrono::Utc;
use pricebot_core::{PriceValue, ProductInfo};
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};

use crate::error::ScraperError;
use crate::parse::PriceParser;

/// A logical piece of the product page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    /// Container holding one displayed price. Price fields are read inside it.
    PriceBlock,
    /// Integer part of the displayed price, possibly with grouping marks.
    PriceWhole,
    /// Digits after the decimal separator.
    PriceFraction,
    /// Currency symbol shown next to the price.
    PriceSymbol,
    /// Full price as one string, e.g. `1.234,56 €`. Used when the fragments
    /// are missing.
    PriceText,
}

/// One way of locating a [`Field`]. Reads the element's text, or `attribute`
/// when set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRule {
    pub field: Field,
    pub selector: String,
    pub attribute: Option<String>,
}

impl ExtractionRule {
    #[must_use]
    pub fn text(field: Field, selector: &str) -> Self {
        Self {
            field,
            selector: selector.to_owned(),
            attribute: None,
        }
    }

    #[must_use]
    pub fn attr(field: Field, selector: &str, attribute: &str) -> Self {
        Self {
            field,
            selector: selector.to_owned(),
            attribute: Some(attribute.to_owned()),
        }
    }
}

/// Selectors for Amazon product pages, in priority order per field.
#[must_use]
pub fn default_rules() -> Vec<ExtractionRule> {
    vec![
        ExtractionRule::text(Field::Name, "span#productTitle"),
        ExtractionRule::text(Field::Name, "#title"),
        ExtractionRule::attr(Field::Name, r#"meta[name="title"]"#, "content"),
        ExtractionRule::text(Field::PriceBlock, "span.a-price"),
        ExtractionRule::text(Field::PriceWhole, "span.a-price-whole"),
        ExtractionRule::text(Field::PriceFraction, "span.a-price-fraction"),
        ExtractionRule::text(Field::PriceSymbol, "span.a-price-symbol"),
        ExtractionRule::text(Field::PriceText, "span.a-offscreen"),
    ]
}

struct CompiledRule {
    rule: ExtractionRule,
    selector: Selector,
}

/// Pulls [`ProductInfo`] out of a page.
///
/// Never fails on content: a field that cannot be found or read is reported
/// as [`Extracted::Unavailable`].
pub struct ProductExtractor {
    rules: Vec<CompiledRule>,
    parser: PriceParser,
}

impl std::fmt::Debug for ProductExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductExtractor")
            .field(
                "rules",
                &self.rules.iter().map(|c| &c.rule).collect::<Vec<_>>(),
            )
            .field("parser", &self.parser)
            .finish()
    }
}

impl ProductExtractor {
    /// Extractor with [`default_rules`].
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] if a built-in selector does
    /// not compile.
    pub fn new(parser: PriceParser) -> Result<Self, ScraperError> {
        Self::with_rules(default_rules(), parser)
    }

    /// Extractor with a custom rule table.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] for the first selector that
    /// does not compile.
    pub fn with_rules(rules: Vec<ExtractionRule>, parser: PriceParser) -> Result<Self, ScraperError> {
        let rules = rules
            .into_iter()
            .map(|rule| {
                let selector =
                    Selector::parse(&rule.selector).map_err(|e| ScraperError::InvalidSelector {
                        selector: rule.selector.clone(),
                        reason: e.to_string(),
                    })?;
                Ok(CompiledRule { rule, selector })
            })
            .collect::<Result<Vec<_>, ScraperError>>()?;
        Ok(Self { rules, parser })
    }

    #[must_use]
    pub fn parser(&self) -> &PriceParser {
        &self.parser
    }

    #[must_use]
    pub fn extract(&self, html: &str) -> ProductInfo {
        let document = Html::parse_document(html);

        let name = self
            .first_match(document.root_element(), Field::Name)
            .map(|raw| collapse_whitespace(&raw))
            .filter(|name| !name.is_empty());

        let price = self.extract_price(&document);

        if name.is_none() {
            tracing::warn!("product name not found on page");
        }
        if price.is_none() {
            tracing::warn!("product price not found on page");
        }

        ProductInfo {
            name: name.into(),
            price: price.into(),
            extracted_at: Utc::now(),
        }
    }

    /// First price block on the page that yields a complete price. Without
    /// any `PriceBlock` rule the whole document is treated as one block.
    fn extract_price(&self, document: &Html) -> Option<PriceValue> {
        let mut blocks = self.rules_for(Field::PriceBlock).peekable();
        if blocks.peek().is_none() {
            return self.price_in(document.root_element());
        }
        blocks
            .flat_map(|compiled| document.select(&compiled.selector))
            .find_map(|block| self.price_in(block))
    }

    fn price_in(&self, block: ElementRef<'_>) -> Option<PriceValue> {
        self.price_from_fragments(block)
            .or_else(|| self.price_from_text(block))
    }

    /// Both the whole and fraction fragments are required.
    fn price_from_fragments(&self, block: ElementRef<'_>) -> Option<PriceValue> {
        let whole = digits_only(&self.first_match(block, Field::PriceWhole)?);
        let fraction = digits_only(&self.first_match(block, Field::PriceFraction)?);
        if whole.is_empty() || fraction.is_empty() {
            return None;
        }

        let amount: Decimal = format!("{whole}.{fraction}").parse().ok()?;
        let currency = self.first_match(block, Field::PriceSymbol).map_or_else(
            || self.parser.default_currency().to_owned(),
            |symbol| self.parser.resolve_currency(&symbol),
        );
        Some(PriceValue::new(amount, currency))
    }

    fn price_from_text(&self, block: ElementRef<'_>) -> Option<PriceValue> {
        let text = self.first_match(block, Field::PriceText)?;
        self.parser.parse(&text).into_option()
    }

    fn rules_for(&self, field: Field) -> impl Iterator<Item = &CompiledRule> + '_ {
        self.rules
            .iter()
            .filter(move |compiled| compiled.rule.field == field)
    }

    /// First non-empty value produced by the rules for `field` among the
    /// descendants of `scope`, in table order.
    fn first_match(&self, scope: ElementRef<'_>, field: Field) -> Option<String> {
        self.rules_for(field).find_map(|compiled| {
            scope
                .select(&compiled.selector)
                .filter_map(|element| read(element, compiled.rule.attribute.as_deref()))
                .find(|value| !value.trim().is_empty())
        })
    }
}

fn read(element: ElementRef<'_>, attribute: Option<&str>) -> Option<String> {
    match attribute {
        Some(attr) => element.value().attr(attr).map(str::to_owned),
        None => Some(element.text().collect()),
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn digits_only(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
