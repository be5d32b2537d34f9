use inventory_core::{FormError, Item, ItemDraft, ItemForm, ItemValidationError};

#[test]
fn draft_validation_enforces_conventions() {
    assert!(ItemDraft::new("Bolt", 0.50, 100).validate().is_ok());
    assert!(ItemDraft::new("Free", 0.0, 0).validate().is_ok());

    assert_eq!(
        ItemDraft::new("Bad", -0.01, 1).validate(),
        Err(ItemValidationError::NegativePrice(-0.01))
    );
    assert_eq!(
        ItemDraft::new("Bad", 1.0, -1).validate(),
        Err(ItemValidationError::NegativeQuantity(-1))
    );
    assert!(matches!(
        ItemDraft::new("Bad", f64::INFINITY, 1).validate(),
        Err(ItemValidationError::NonFinitePrice(_))
    ));
}

#[test]
fn with_id_attaches_identity_without_changing_fields() {
    let item = ItemDraft::new("Bolt", 0.50, 100).with_id(3);
    assert_eq!(
        item,
        Item {
            id: 3,
            name: "Bolt".to_string(),
            price: 0.50,
            quantity: 100,
        }
    );
    assert!(item.validate().is_ok());
}

#[test]
fn formatted_price_renders_two_decimals() {
    let item = ItemDraft::new("Bolt", 0.5, 100).with_id(1);
    assert_eq!(item.formatted_price(), "$0.50");
}

#[test]
fn form_parses_trimmed_input_into_a_draft() {
    let form = ItemForm::new("  Bolt  ", " 0.50 ", " 100 ");
    assert_eq!(form.parse().unwrap(), ItemDraft::new("Bolt", 0.50, 100));
}

#[test]
fn form_rejects_blank_name_and_non_numeric_fields() {
    assert_eq!(
        ItemForm::new("   ", "1.0", "1").parse(),
        Err(FormError::BlankName)
    );
    assert_eq!(
        ItemForm::new("Bolt", "cheap", "1").parse(),
        Err(FormError::InvalidPrice("cheap".to_string()))
    );
    assert_eq!(
        ItemForm::new("Bolt", "1.0", "many").parse(),
        Err(FormError::InvalidQuantity("many".to_string()))
    );
    // Quantity is an integer field; fractional input does not parse.
    assert!(matches!(
        ItemForm::new("Bolt", "1.0", "1.5").parse(),
        Err(FormError::InvalidQuantity(_))
    ));
}

#[test]
fn form_seeds_edit_flow_from_an_existing_item() {
    let item = ItemDraft::new("Bolt", 0.75, 90).with_id(1);
    let form = ItemForm::from(&item);
    assert_eq!(form.name, "Bolt");
    assert_eq!(form.price, "0.75");
    assert_eq!(form.quantity, "90");

    // Round-tripping through the form preserves the record fields.
    assert_eq!(form.parse().unwrap().with_id(item.id), item);
}

#[test]
fn item_serializes_with_stable_field_names() {
    let item = ItemDraft::new("Bolt", 0.50, 100).with_id(1);
    let value = serde_json::to_value(&item).unwrap();
    assert_eq!(value["id"], 1);
    assert_eq!(value["name"], "Bolt");
    assert_eq!(value["price"], 0.50);
    assert_eq!(value["quantity"], 100);
}
