//! Product catalogue input: CSV parsing and the built-in sample set.
//!
//! The CSV reader handles the subset spreadsheet exports produce: a header
//! row, comma separators, and double-quoted fields with `""` escapes and
//! embedded newlines.

use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use storechat_core::Price;
use storechat_server::models::NewProduct;

/// Errors reading a product CSV.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogueError {
    #[error("file is empty")]
    Empty,

    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),

    #[error("line {line}: {message}")]
    Row { line: usize, message: String },

    #[error("line {0}: unterminated quoted field")]
    UnterminatedQuote(usize),
}

/// Accepted header names for each field, preferred name first.
const NAME: &[&str] = &["name", "product_name"];
const DESCRIPTION: &[&str] = &["description", "desc"];
const PRICE: &[&str] = &["price"];
const CATEGORY: &[&str] = &["category", "type"];
const BRAND: &[&str] = &["brand", "manufacturer"];
const IN_STOCK: &[&str] = &["in_stock"];

/// A record and the line it started on.
type Record = (usize, Vec<String>);

fn split_records(text: &str) -> Result<Vec<Record>, CatalogueError> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            ('"', true) => in_quotes = false,
            ('"', false) if field.is_empty() => in_quotes = true,
            ('\n', true) => {
                line += 1;
                field.push('\n');
            }
            (',', false) => fields.push(std::mem::take(&mut field)),
            ('\r', false) => {}
            ('\n', false) => {
                fields.push(std::mem::take(&mut field));
                if fields.iter().any(|f| !f.is_empty()) {
                    records.push((record_line, std::mem::take(&mut fields)));
                } else {
                    fields.clear();
                }
                line += 1;
                record_line = line;
            }
            (c, _) => field.push(c),
        }
    }

    if in_quotes {
        return Err(CatalogueError::UnterminatedQuote(record_line));
    }

    fields.push(field);
    if fields.iter().any(|f| !f.is_empty()) {
        records.push((record_line, fields));
    }

    Ok(records)
}

fn column(header: &[String], names: &[&str]) -> Option<usize> {
    names.iter().find_map(|name| {
        header
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    })
}

fn parse_in_stock(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Parse a product CSV into rows ready to insert.
///
/// Only `name` is required. Blank optional cells become `None`; a missing or
/// blank `in_stock` means in stock.
///
/// # Errors
///
/// Returns `CatalogueError` on a missing `name` column, a malformed price or
/// stock flag, a blank name, or an unterminated quote.
pub fn parse_catalogue(text: &str) -> Result<Vec<NewProduct>, CatalogueError> {
    let mut records = split_records(text)?.into_iter();
    let (_, header) = records.next().ok_or(CatalogueError::Empty)?;

    let name_col = column(&header, NAME).ok_or(CatalogueError::MissingColumn("name"))?;
    let description_col = column(&header, DESCRIPTION);
    let price_col = column(&header, PRICE);
    let category_col = column(&header, CATEGORY);
    let brand_col = column(&header, BRAND);
    let in_stock_col = column(&header, IN_STOCK);

    records
        .map(|(line, fields)| -> Result<NewProduct, CatalogueError> {
            let cell = |col: Option<usize>| {
                col.and_then(|i| fields.get(i))
                    .map(|v| v.trim())
                    .filter(|v| !v.is_empty())
            };
            let row_error = |message: String| CatalogueError::Row { line, message };

            let name = cell(Some(name_col))
                .ok_or_else(|| row_error("product name is blank".to_owned()))?
                .to_owned();

            let price = cell(price_col)
                .map(|raw| {
                    Decimal::from_str(raw.trim_start_matches('$'))
                        .ok()
                        .and_then(Price::new)
                        .ok_or_else(|| row_error(format!("invalid price `{raw}`")))
                })
                .transpose()?;

            let in_stock = match cell(in_stock_col) {
                Some(raw) => parse_in_stock(raw)
                    .ok_or_else(|| row_error(format!("invalid in_stock value `{raw}`")))?,
                None => true,
            };

            Ok(NewProduct {
                name,
                description: cell(description_col).map(String::from),
                category: cell(category_col).map(String::from),
                brand: cell(brand_col).map(String::from),
                price,
                in_stock,
            })
        })
        .collect()
}

/// The sample electronics catalogue inserted when no CSV is given.
#[must_use]
pub fn sample_catalogue() -> Vec<NewProduct> {
    const SAMPLES: [(&str, &str, i64, &str, &str); 10] = [
        ("ASUS VivoBook 15", "Intel i5, 8GB RAM, 512GB SSD - Perfect for students and professionals", 74_999, "Laptops", "ASUS"),
        ("Lenovo IdeaPad 3", "AMD Ryzen 5, 8GB RAM, 256GB SSD - Great value laptop", 64_999, "Laptops", "Lenovo"),
        ("HP Pavilion 15", "Intel i7, 16GB RAM, 1TB SSD - High performance laptop", 89_999, "Laptops", "HP"),
        ("Dell XPS 13", "Intel i7, 16GB RAM, 512GB SSD - Premium ultrabook", 129_999, "Laptops", "Dell"),
        ("MacBook Air M2", "Apple M2 chip, 8GB RAM, 256GB SSD - Latest Apple laptop", 119_999, "Laptops", "Apple"),
        ("Logitech MX Master 3", "Wireless mouse with advanced precision and customization", 9_999, "Accessories", "Logitech"),
        ("Mechanical Keyboard RGB", "Gaming mechanical keyboard with RGB lighting", 14_999, "Accessories", "Corsair"),
        ("Sony WH-1000XM4", "Wireless noise-canceling headphones", 34_999, "Audio", "Sony"),
        ("Samsung 27\" 4K Monitor", "4K UHD monitor with HDR support", 32_999, "Monitors", "Samsung"),
        ("External SSD 1TB", "Portable SSD with USB-C connectivity", 12_999, "Storage", "SanDisk"),
    ];

    SAMPLES
        .iter()
        .map(|&(name, description, cents, category, brand)| NewProduct {
            name: name.to_owned(),
            description: Some(description.to_owned()),
            category: Some(category.to_owned()),
            brand: Some(brand.to_owned()),
            price: Price::new(Decimal::new(cents, 2)),
            in_stock: true,
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_full_rows() {
        let csv = "name,description,price,category,brand,in_stock\n\
                   Trail Shoe,Light runner,89.50,Footwear,Acme,true\n\
                   Old Boot,,12,Footwear,,false\n";

        let products = parse_catalogue(csv).unwrap();
        assert_eq!(products.len(), 2);

        assert_eq!(products[0].name, "Trail Shoe");
        assert_eq!(products[0].brand.as_deref(), Some("Acme"));
        assert_eq!(products[0].price.unwrap().amount(), Decimal::new(8950, 2));
        assert!(products[0].in_stock);

        assert!(products[1].description.is_none());
        assert!(products[1].brand.is_none());
        assert!(!products[1].in_stock);
    }

    #[test]
    fn test_quoted_fields_and_aliases() {
        let csv = "product_name,desc,manufacturer,price\r\n\
                   \"Samsung 27\"\" Monitor\",\"4K, HDR\",Samsung,$329.99\r\n";

        let products = parse_catalogue(csv).unwrap();
        assert_eq!(products[0].name, "Samsung 27\" Monitor");
        assert_eq!(products[0].description.as_deref(), Some("4K, HDR"));
        assert_eq!(products[0].brand.as_deref(), Some("Samsung"));
        assert!(products[0].in_stock);
    }

    #[test]
    fn test_multiline_quoted_description() {
        let csv = "name,description\nLamp,\"Warm light\nDimmable\"\nDesk,Oak\n";
        let products = parse_catalogue(csv).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].description.as_deref(), Some("Warm light\nDimmable"));
        assert_eq!(products[1].name, "Desk");
    }

    #[test]
    fn test_skips_blank_lines() {
        let csv = "name\n\nLamp\n\n";
        assert_eq!(parse_catalogue(csv).unwrap().len(), 1);
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_catalogue(""), Err(CatalogueError::Empty));
        assert_eq!(
            parse_catalogue("title,price\nLamp,1\n"),
            Err(CatalogueError::MissingColumn("name"))
        );
        assert!(matches!(
            parse_catalogue("name,price\nLamp,cheap\n"),
            Err(CatalogueError::Row { line: 2, .. })
        ));
        assert!(matches!(
            parse_catalogue("name,price\nLamp,-3\n"),
            Err(CatalogueError::Row { line: 2, .. })
        ));
        assert!(matches!(
            parse_catalogue("name,in_stock\nLamp,sometimes\n"),
            Err(CatalogueError::Row { line: 2, .. })
        ));
        assert!(matches!(
            parse_catalogue("name,price\n,5\n"),
            Err(CatalogueError::Row { line: 2, .. })
        ));
        assert_eq!(
            parse_catalogue("name\n\"Lamp\n"),
            Err(CatalogueError::UnterminatedQuote(2))
        );
    }

    #[test]
    fn test_sample_catalogue() {
        let products = sample_catalogue();
        assert_eq!(products.len(), 10);
        assert!(products.iter().all(|p| p.in_stock && p.price.is_some()));
        assert!(products.iter().any(|p| p.name == "Dell XPS 13"));
    }
}
