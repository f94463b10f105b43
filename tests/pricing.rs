use make_the_print_api::pricing::{
    AddonConfig, CustomConfig, InquireConfig, LetteringSelection, PresetConfig, SizePrice,
    price_for_size, quote, size_labels,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

fn sizes() -> Vec<SizePrice> {
    vec![
        SizePrice {
            label: "Small".into(),
            price_per_character: dec!(2),
        },
        SizePrice {
            label: "20cm".into(),
            price_per_character: dec!(1.5),
        },
        SizePrice {
            label: " 40cm ".into(),
            price_per_character: dec!(3),
        },
    ]
}

#[test]
fn size_lookup_is_case_and_whitespace_insensitive() {
    let table = sizes();
    assert_eq!(price_for_size(&table, " Small "), dec!(2));
    assert_eq!(price_for_size(&table, "small"), dec!(2));
    assert_eq!(price_for_size(&table, "SMALL"), dec!(2));
    assert_eq!(
        price_for_size(&table, " Small "),
        price_for_size(&table, "small")
    );
    assert_eq!(price_for_size(&table, "40cm"), dec!(3));
}

#[test]
fn unknown_size_prices_at_zero() {
    let table = sizes();
    assert_eq!(price_for_size(&table, "60cm"), Decimal::ZERO);
    assert_eq!(price_for_size(&[], "anything"), Decimal::ZERO);
}

#[test]
fn size_labels_keep_order_and_drop_blanks() {
    let mut table = sizes();
    table.insert(
        1,
        SizePrice {
            label: "   ".into(),
            price_per_character: dec!(9),
        },
    );
    assert_eq!(size_labels(&table), vec!["Small", "20cm", "40cm"]);
}

fn lettering_config() -> PresetConfig {
    PresetConfig {
        size_prices: sizes(),
        price_per_character: dec!(1),
        colors: vec!["Black".into(), "Gold".into()],
        fonts: vec!["Montserrat".into()],
        default_font: Some("Montserrat".into()),
        outdoor: AddonConfig {
            enabled: true,
            price: dec!(10),
        },
        led_strip: AddonConfig {
            enabled: false,
            price: dec!(999),
        },
        color: AddonConfig {
            enabled: true,
            price: dec!(5),
        },
    }
}

#[test]
fn quote_charges_per_character_plus_selected_addons() {
    let config = lettering_config();
    let selection = LetteringSelection {
        text: "HELLO".into(),
        size: "20cm".into(),
        outdoor: true,
        led_strip: false,
        color: false,
    };
    let quoted = quote(&config, &selection);
    assert_eq!(quoted.character_count, 5);
    assert_eq!(quoted.price_per_character, dec!(1.5));
    assert_eq!(quoted.total, dec!(17.5));
}

#[test]
fn disabled_addon_never_contributes_even_when_selected() {
    let config = lettering_config();
    let selection = LetteringSelection {
        text: "HELLO".into(),
        size: "20cm".into(),
        outdoor: false,
        led_strip: true,
        color: false,
    };
    // led_strip carries a non-zero price in config but is disabled.
    assert_eq!(quote(&config, &selection).total, dec!(7.5));
}

#[test]
fn unselected_addon_is_not_charged() {
    let config = lettering_config();
    let selection = LetteringSelection {
        text: "HI".into(),
        size: "Small".into(),
        outdoor: false,
        led_strip: false,
        color: false,
    };
    assert_eq!(quote(&config, &selection).total, dec!(4));
}

#[test]
fn empty_text_contributes_nothing() {
    let config = lettering_config();
    let selection = LetteringSelection {
        text: String::new(),
        size: "20cm".into(),
        outdoor: false,
        led_strip: false,
        color: false,
    };
    let quoted = quote(&config, &selection);
    assert_eq!(quoted.character_count, 0);
    assert_eq!(quoted.total, Decimal::ZERO);
}

#[test]
fn fallback_per_character_price_applies_when_size_table_is_empty() {
    let config = PresetConfig {
        price_per_character: dec!(2.5),
        ..Default::default()
    };
    assert_eq!(config.unit_price("whatever"), dec!(2.5));

    // With a table present, an unmatched size is a zero, not the fallback.
    let config = lettering_config();
    assert_eq!(config.unit_price("60cm"), Decimal::ZERO);
}

#[test]
fn customer_options_hide_disabled_addons() {
    let options = lettering_config().customer_options();
    assert_eq!(options.outdoor_price, Some(dec!(10)));
    assert_eq!(options.led_strip_price, None);
    assert_eq!(options.color_price, Some(dec!(5)));
    assert_eq!(options.sizes.len(), 3);
    assert_eq!(options.sizes[2].label, "40cm");
    assert_eq!(options.default_font.as_deref(), Some("Montserrat"));
}

#[test]
fn malformed_config_degrades_to_zero_prices_and_empty_options() {
    let raw = json!(["not", "an", "object"]);
    let resolved = CustomConfig::resolve("preset", Some(&raw));
    let config = resolved.as_preset().expect("preset variant");
    assert!(config.size_prices.is_empty());
    assert_eq!(config.price_per_character, Decimal::ZERO);

    let selection = LetteringSelection {
        text: "HELLO".into(),
        size: "20cm".into(),
        outdoor: true,
        led_strip: true,
        color: true,
    };
    assert_eq!(quote(config, &selection).total, Decimal::ZERO);
    assert!(config.customer_options().sizes.is_empty());
}

#[test]
fn missing_config_resolves_by_category() {
    assert!(matches!(
        CustomConfig::resolve("preset", None),
        CustomConfig::Preset(_)
    ));
    assert!(matches!(
        CustomConfig::resolve("inquire", None),
        CustomConfig::Inquire(_)
    ));
    assert!(matches!(
        CustomConfig::resolve("finished", None),
        CustomConfig::Finished
    ));
    assert!(matches!(
        CustomConfig::resolve("something-else", None),
        CustomConfig::Finished
    ));
}

#[test]
fn inquiry_contact_requires_a_number_and_substitutes_the_product_name() {
    let config = InquireConfig {
        whatsapp_number: None,
        whatsapp_message: Some("About {product_name}".into()),
    };
    assert!(config.contact("Vase").is_none());

    let config = InquireConfig {
        whatsapp_number: Some(" +155512345 ".into()),
        whatsapp_message: Some("I'd like a quote for {product_name}.".into()),
    };
    let contact = config.contact("Custom Vase").expect("contact");
    assert_eq!(contact.whatsapp_number, "+155512345");
    assert_eq!(contact.message, "I'd like a quote for Custom Vase.");

    let config = InquireConfig {
        whatsapp_number: Some("+155512345".into()),
        whatsapp_message: None,
    };
    let contact = config.contact("Custom Vase").expect("contact");
    assert!(contact.message.contains("Custom Vase"));
}
