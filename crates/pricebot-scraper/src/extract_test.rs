use std::str::FromStr;

use pricebot_core::Extracted;

use super::*;

fn extractor() -> ProductExtractor {
    ProductExtractor::new(PriceParser::new("EUR")).unwrap()
}

fn amount(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

const FULL_PAGE: &str = r#"
<html>
  <head><meta name="title" content="Meta title"></head>
  <body>
    <span id="productTitle">
        Cafetera   Espresso
        Deluxe
    </span>
    <span class="a-price">
      <span class="a-price-whole">1.234<span class="a-price-decimal">,</span></span>
      <span class="a-price-fraction">56</span>
      <span class="a-price-symbol">€</span>
    </span>
  </body>
</html>
"#;

// -----------------------------------------------------------------------
// Full pages
// -----------------------------------------------------------------------

#[test]
fn extracts_name_and_price() {
    let info = extractor().extract(FULL_PAGE);
    assert_eq!(
        info.name,
        Extracted::Found("Cafetera Espresso Deluxe".to_owned())
    );
    let price = info.price.as_found().unwrap();
    assert_eq!(price.amount, amount("1234.56"));
    assert_eq!(price.currency, "EUR");
    assert!(!info.is_degraded());
}

#[test]
fn symbol_selects_currency() {
    let html = r#"
        <span id="productTitle">Widget</span>
        <span class="a-price">
          <span class="a-price-symbol">$</span>
          <span class="a-price-whole">19.</span>
          <span class="a-price-fraction">99</span>
        </span>
    "#;
    let price = extractor().extract(html).price.into_option().unwrap();
    assert_eq!(price.amount, amount("19.99"));
    assert_eq!(price.currency, "USD");
}

#[test]
fn missing_symbol_uses_default_currency() {
    let html = r#"
        <span class="a-price">
          <span class="a-price-whole">7</span>
          <span class="a-price-fraction">50</span>
        </span>
    "#;
    let price = ProductExtractor::new(PriceParser::new("GBP"))
        .unwrap()
        .extract(html)
        .price
        .into_option()
        .unwrap();
    assert_eq!(price.currency, "GBP");
}

#[test]
fn first_matching_price_on_page_wins() {
    let html = r#"
        <span class="a-price"><span class="a-price-whole">10</span><span class="a-price-fraction">00</span></span>
        <span class="a-price"><span class="a-price-whole">99</span><span class="a-price-fraction">99</span></span>
    "#;
    let price = extractor().extract(html).price.into_option().unwrap();
    assert_eq!(price.amount, amount("10.00"));
}

#[test]
fn fragments_are_never_combined_across_price_blocks() {
    let html = r#"
        <span id="productTitle">Widget</span>
        <span class="a-price">
          <span class="a-price-whole">12</span>
          <span class="a-price-symbol">$</span>
        </span>
        <span class="a-price">
          <span class="a-price-whole">99</span>
          <span class="a-price-fraction">50</span>
          <span class="a-price-symbol">€</span>
        </span>
    "#;
    let price = extractor().extract(html).price.into_option().unwrap();
    assert_eq!(price.amount, amount("99.50"));
    assert_eq!(price.currency, "EUR");
}

#[test]
fn incomplete_block_does_not_borrow_stray_fragments() {
    let html = r#"
        <span class="a-price"><span class="a-price-whole">12</span></span>
        <span class="a-price-fraction">50</span>
        <span class="a-price-symbol">$</span>
    "#;
    assert!(extractor().extract(html).price.is_unavailable());
}

#[test]
fn fragments_outside_any_price_block_are_ignored() {
    let html = r#"
        <span class="a-price-whole">25</span>
        <span class="a-price-fraction">90</span>
    "#;
    assert!(extractor().extract(html).price.is_unavailable());
}

// -----------------------------------------------------------------------
// Full price text
// -----------------------------------------------------------------------

#[test]
fn price_text_is_parsed_when_fragments_are_missing() {
    let html = r#"
        <span class="a-price"><span class="a-offscreen">1.234,56 €</span></span>
    "#;
    let price = extractor().extract(html).price.into_option().unwrap();
    assert_eq!(price.amount, amount("1234.56"));
    assert_eq!(price.currency, "EUR");
}

#[test]
fn price_text_currency_comes_from_the_text() {
    let html = r#"<span class="a-price"><span class="a-offscreen">$1,299.00</span></span>"#;
    let price = extractor().extract(html).price.into_option().unwrap();
    assert_eq!(price.amount, amount("1299.00"));
    assert_eq!(price.currency, "USD");
}

#[test]
fn ambiguous_price_text_falls_through_to_next_block() {
    let html = r#"
        <span class="a-price"><span class="a-offscreen">12,00 € - 15,00 €</span></span>
        <span class="a-price"><span class="a-offscreen">9,99 €</span></span>
    "#;
    let price = extractor().extract(html).price.into_option().unwrap();
    assert_eq!(price.amount, amount("9.99"));
}

#[test]
fn fragments_take_precedence_over_price_text() {
    let html = r#"
        <span class="a-price">
          <span class="a-offscreen">garbled</span>
          <span class="a-price-whole">5</span>
          <span class="a-price-fraction">25</span>
        </span>
    "#;
    let price = extractor().extract(html).price.into_option().unwrap();
    assert_eq!(price.amount, amount("5.25"));
}

// -----------------------------------------------------------------------
// Name fallbacks
// -----------------------------------------------------------------------

#[test]
fn name_falls_back_to_title_id() {
    let html = r#"<div id="title"> Lámpara LED </div>"#;
    assert_eq!(
        extractor().extract(html).name,
        Extracted::Found("Lámpara LED".to_owned())
    );
}

#[test]
fn name_falls_back_to_meta_title() {
    let html = r#"<html><head><meta name="title" content="Meta  Product"></head></html>"#;
    assert_eq!(
        extractor().extract(html).name,
        Extracted::Found("Meta Product".to_owned())
    );
}

#[test]
fn blank_title_is_skipped_in_favour_of_next_rule() {
    let html = r#"
        <span id="productTitle">   </span>
        <div id="title">Real name</div>
    "#;
    assert_eq!(
        extractor().extract(html).name,
        Extracted::Found("Real name".to_owned())
    );
}

// -----------------------------------------------------------------------
// Degraded pages
// -----------------------------------------------------------------------

#[test]
fn missing_title_still_yields_price() {
    let html = r#"
        <span class="a-price">
          <span class="a-price-whole">25</span>
          <span class="a-price-fraction">90</span>
          <span class="a-price-symbol">€</span>
        </span>
    "#;
    let info = extractor().extract(html);
    assert!(info.name.is_unavailable());
    assert_eq!(info.name.to_string(), "unavailable");
    assert_eq!(info.price.as_found().unwrap().amount, amount("25.90"));
}

#[test]
fn partial_price_is_unavailable() {
    let whole_only = r#"<span id="productTitle">X</span>
        <span class="a-price"><span class="a-price-whole">25</span></span>"#;
    let fraction_only = r#"<span id="productTitle">X</span>
        <span class="a-price"><span class="a-price-fraction">90</span></span>"#;
    assert!(extractor().extract(whole_only).price.is_unavailable());
    assert!(extractor().extract(fraction_only).price.is_unavailable());
}

#[test]
fn non_numeric_fragments_are_unavailable() {
    let html = r#"
        <span class="a-price">
          <span class="a-price-whole">--</span>
          <span class="a-price-fraction">n/a</span>
        </span>
    "#;
    assert!(extractor().extract(html).price.is_unavailable());
}

#[test]
fn malformed_html_never_panics() {
    for html in [
        "",
        "<<<>>>",
        "<span id=\"productTitle\">Unclosed",
        "<span class=\"a-price-whole\">12<span class=\"a-price-fraction\">34",
        "\u{0}\u{1}binary\u{fffd}",
    ] {
        let info = extractor().extract(html);
        let _ = info.is_degraded();
    }
}

#[test]
fn unclosed_tags_are_repaired() {
    let info = extractor().extract("<span id=\"productTitle\">Unclosed");
    assert_eq!(info.name, Extracted::Found("Unclosed".to_owned()));
}

#[test]
fn captcha_page_is_fully_unavailable() {
    let html = r#"<html><body><form action="/errors/validateCaptcha">Introduce los caracteres</form></body></html>"#;
    let info = extractor().extract(html);
    assert!(info.name.is_unavailable());
    assert!(info.price.is_unavailable());
    assert!(info.is_degraded());
}

// -----------------------------------------------------------------------
// Rule tables
// -----------------------------------------------------------------------

#[test]
fn custom_rules_replace_defaults() {
    let rules = vec![
        ExtractionRule::attr(Field::Name, "h1", "data-name"),
        ExtractionRule::text(Field::PriceWhole, ".int"),
        ExtractionRule::text(Field::PriceFraction, ".dec"),
    ];
    let extractor = ProductExtractor::with_rules(rules, PriceParser::new("EUR")).unwrap();
    let html = r#"<h1 data-name="Custom">ignored text</h1><b class="int">3</b><b class="dec">05</b>"#;
    let info = extractor.extract(html);
    assert_eq!(info.name, Extracted::Found("Custom".to_owned()));
    assert_eq!(info.price.as_found().unwrap().amount, amount("3.05"));
}

#[test]
fn invalid_selector_is_rejected() {
    let rules = vec![ExtractionRule::text(Field::Name, "span[[")];
    let err = ProductExtractor::with_rules(rules, PriceParser::default()).unwrap_err();
    assert!(
        matches!(err, ScraperError::InvalidSelector { ref selector, .. } if selector == "span[["),
        "{err:?}"
    );
}

#[test]
fn custom_rules_without_block_read_the_whole_document() {
    let rules = vec![ExtractionRule::text(Field::PriceText, "#total")];
    let extractor = ProductExtractor::with_rules(rules, PriceParser::new("EUR")).unwrap();
    let price = extractor
        .extract(r#"<p id="total">£8.40</p>"#)
        .price
        .into_option()
        .unwrap();
    assert_eq!(price.amount, amount("8.40"));
    assert_eq!(price.currency, "GBP");
}

#[test]
fn default_rules_compile() {
    assert!(ProductExtractor::new(PriceParser::default()).is_ok());
    assert_eq!(
        default_rules()
            .iter()
            .filter(|r| r.field == Field::Name)
            .count(),
        3
    );
}
