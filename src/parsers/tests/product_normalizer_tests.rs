use crate::parsers::product::{self, COLOR_MARKER};
use crate::results::{CategorySource, ProductRecord, ScrapedElement};

mod reference_tests {
    use super::*;

    #[test]
    fn test_reference_found() {
        let result = product::extract_reference("Referencia: 123 Product Name $10.00 $19.99");
        assert_eq!(result.referencia, "123");
        assert_eq!(result.contenido, "Product Name $10.00 $19.99");
    }

    #[test]
    fn test_reference_in_the_middle() {
        let result = product::extract_reference("Taladro Referencia:   98765 $50.00");
        assert_eq!(result.referencia, "98765");
        assert_eq!(result.contenido, "Taladro  $50.00");
    }

    #[test]
    fn test_no_reference_returns_trimmed_input() {
        let result = product::extract_reference("   Martillo $12.00  ");
        assert_eq!(result.referencia, "");
        assert_eq!(result.contenido, "Martillo $12.00");

        // A label without digits is not a reference
        let result = product::extract_reference("Referencia: N/A Martillo");
        assert_eq!(result.referencia, "");
        assert_eq!(result.contenido, "Referencia: N/A Martillo");
    }

    #[test]
    fn test_only_first_reference_is_removed() {
        let result = product::extract_reference("Referencia: 1 Referencia: 2 Kit");
        assert_eq!(result.referencia, "1");
        assert_eq!(result.contenido, "Referencia: 2 Kit");
    }
}

mod price_split_tests {
    use super::*;

    #[test]
    fn test_two_prices() {
        let result = product::split_product_price("Product Name $10.00 $19.99");
        assert_eq!(result.producto, "Product Name");
        assert_eq!(result.precio_uno, "$10.00");
        assert_eq!(result.precio_dos, "$19.99");
    }

    #[test]
    fn test_second_price_is_cut_after_last_decimal() {
        let result = product::split_product_price("Sierra $80.50 $99.90 Ahorra 20%");
        assert_eq!(result.producto, "Sierra");
        assert_eq!(result.precio_uno, "$80.50");
        assert_eq!(result.precio_dos, "$99.90");
    }

    #[test]
    fn test_second_price_without_decimals_is_kept() {
        let result = product::split_product_price("Sierra $80.50 $99 oferta");
        assert_eq!(result.precio_dos, "$99 oferta");
    }

    #[test]
    fn test_single_price() {
        let result = product::split_product_price("Llave inglesa $1,234.56 IVA incluido");
        assert_eq!(result.producto, "Llave inglesa");
        assert_eq!(result.precio_uno, "$1,234.56 IVA incluido");
        assert_eq!(result.precio_dos, "");
    }

    #[test]
    fn test_no_dollar_sign() {
        let result = product::split_product_price("Producto sin precio");
        assert_eq!(result.producto, "Producto sin precio");
        assert_eq!(result.precio_uno, "");
        assert_eq!(result.precio_dos, "");
    }

    #[test]
    fn test_leading_dollar_sign() {
        let result = product::split_product_price("$5.00 $6.00");
        assert_eq!(result.producto, "");
        assert_eq!(result.precio_uno, "$5.00");
        assert_eq!(result.precio_dos, "$6.00");
    }
}

mod price_value_tests {
    use super::*;

    #[test]
    fn test_parse_price() {
        assert_eq!(product::parse_price("$10.00"), Some(10.0));
        assert_eq!(product::parse_price("$1,234.56"), Some(1234.56));
        assert_eq!(product::parse_price("$10,50"), Some(10.5));
        assert_eq!(product::parse_price("$1.234,56"), Some(1234.56));
        assert_eq!(product::parse_price("$ 25"), Some(25.0));
    }

    #[test]
    fn test_parse_price_empty_or_garbage() {
        assert_eq!(product::parse_price(""), None);
        assert_eq!(product::parse_price("$"), None);
        assert_eq!(product::parse_price("Agotado"), None);
        assert_eq!(product::parse_price("$1.2.3"), None);
    }
}

mod markup_tests {
    use super::*;

    #[test]
    fn test_extract_img_url() {
        assert_eq!(
            product::extract_img_url("<div><img src='a.png'/></div>"),
            "a.png"
        );
        assert_eq!(
            product::extract_img_url(
                r#"<IMG class="vtex-product-summary" SRC="https://cdn.example.com/p/1.jpg" alt="">"#
            ),
            "https://cdn.example.com/p/1.jpg"
        );
    }

    #[test]
    fn test_extract_first_img_only() {
        let html = r#"<img src="first.webp"><img src="second.webp">"#;
        assert_eq!(product::extract_img_url(html), "first.webp");
    }

    #[test]
    fn test_no_img() {
        assert_eq!(product::extract_img_url("<div><span>no image</span></div>"), "");
        assert_eq!(product::extract_img_url(""), "");
    }

    #[test]
    fn test_clean_text() {
        let text = format!("  Pintura Roja {COLOR_MARKER} $10.00 {COLOR_MARKER}  ");
        assert_eq!(product::clean_text(&text), "Pintura Roja  $10.00");
        assert_eq!(product::clean_text("\n\tBrocha\n"), "Brocha");
    }
}

mod record_tests {
    use super::*;

    fn source() -> CategorySource {
        CategorySource::new("https://shop.example.com/pinturas?map=c", "Pinturas")
    }

    #[test]
    fn test_full_card() {
        let element = ScrapedElement::new(
            format!("Referencia: 4521 Esmalte Blanco 1L {COLOR_MARKER} $10.00 $19.99"),
            r#"<a href="/esmalte/p"><img src="https://cdn.example.com/4521.jpg"></a>"#,
        );
        let record = ProductRecord::from_element(&element, &source());

        assert_eq!(record.id, Some(4521));
        assert_eq!(record.name, "Esmalte Blanco 1L");
        assert_eq!(record.price, Some(10.0));
        assert_eq!(record.image, "https://cdn.example.com/4521.jpg");
        assert_eq!(record.category, "Pinturas");
        assert_eq!(record.source_url, "https://shop.example.com/pinturas?map=c");
    }

    #[test]
    fn test_card_without_reference_or_price() {
        let mut element = ScrapedElement::new("Consultar disponibilidad", "");
        element.html = None;
        let record = ProductRecord::from_element(&element, &source());

        assert_eq!(record.id, None);
        assert_eq!(record.name, "Consultar disponibilidad");
        assert_eq!(record.price, None);
        assert_eq!(record.image, "");
    }

    #[test]
    fn test_reference_requires_ascii_digits() {
        let text = "Referencia: \u{0661}\u{0662}\u{0663} Taladro $5.00";
        let result = product::extract_reference(text);
        assert_eq!(result.referencia, "");
        assert_eq!(result.contenido, text);

        let record = ProductRecord::from_element(&ScrapedElement::new(text, ""), &source());
        assert_eq!(record.id, None);
        assert!(record.name.starts_with("Referencia:"));
        assert_eq!(record.price, Some(5.0));
    }

    #[test]
    fn test_list_price_truncation_ignores_non_ascii_digits() {
        let result = product::split_product_price("Sierra $10.00 $19.99 \u{0661}.\u{0662}\u{0663}");
        assert_eq!(result.precio_dos, "$19.99");
    }

    #[test]
    fn test_record_wire_keys() {
        let element = ScrapedElement::new("Referencia: 7 Lija $2.50", "");
        let record = ProductRecord::from_element(&element, &source());
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["id"], 7);
        assert_eq!(value["nombre"], "Lija");
        assert_eq!(value["precio"], 2.5);
        assert_eq!(value["imagen"], "");
        assert_eq!(value["categoria"], "Pinturas");
        assert_eq!(value["url"], "https://shop.example.com/pinturas?map=c");
    }
}
