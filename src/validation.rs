//! Per-record rules checked before anything is written.
//!
//! Rules run in a fixed order and the first violation is reported; there are
//! no cross-record checks here, referential integrity belongs to the store.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::{
    Attribute, Barcode, Category, Company, Inventory, Product, Sku, SkuAttribute, User, Warehouse,
    DEFAULT_BARCODE_NAME,
};

pub trait Rules {
    /// Rules applied on create.
    fn check(&self) -> Result<(), ServiceError>;

    /// Rules applied on update; the create rules unless a record adds more.
    fn check_update(&self) -> Result<(), ServiceError> {
        self.check()
    }
}

fn fail(message: &str) -> Result<(), ServiceError> {
    Err(ServiceError::ValidationError(message.to_string()))
}

fn require_text(value: &str, message: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return fail(message);
    }
    Ok(())
}

fn require_id(value: &Uuid, message: &str) -> Result<(), ServiceError> {
    if value.is_nil() {
        return fail(message);
    }
    Ok(())
}

fn require_positive(value: &Decimal, message: &str) -> Result<(), ServiceError> {
    if *value <= Decimal::ZERO {
        return fail(message);
    }
    Ok(())
}

impl Rules for Product {
    fn check(&self) -> Result<(), ServiceError> {
        require_text(&self.name, "Product name is required")?;
        require_positive(&self.price, "Price must be greater than 0")
    }
}

impl Rules for Sku {
    fn check(&self) -> Result<(), ServiceError> {
        require_text(&self.code, "SKU code is required")?;
        require_positive(&self.price, "Price must be greater than 0")?;
        require_id(&self.product_id, "Product ID is required")
    }
}

impl Rules for Attribute {
    fn check(&self) -> Result<(), ServiceError> {
        require_text(&self.name, "Attribute name is required")
    }
}

impl Rules for SkuAttribute {
    fn check(&self) -> Result<(), ServiceError> {
        require_id(&self.attribute_id, "Attribute ID is required")?;
        require_text(&self.value, "Attribute value is required")
    }
}

impl Barcode {
    /// Gives an unnamed barcode the default name.
    pub fn with_default_name(mut self) -> Self {
        if self.name.trim().is_empty() {
            self.name = DEFAULT_BARCODE_NAME.to_string();
        }
        self
    }
}

impl Rules for Barcode {
    fn check(&self) -> Result<(), ServiceError> {
        require_text(&self.value, "Barcode value is required")?;
        require_id(&self.sku_id, "SKU ID is required")
    }
}

impl Rules for Category {
    fn check(&self) -> Result<(), ServiceError> {
        require_text(&self.name, "Category name is required")
    }
}

impl Rules for Warehouse {
    fn check(&self) -> Result<(), ServiceError> {
        require_text(&self.name, "Warehouse name is required")
    }

    fn check_update(&self) -> Result<(), ServiceError> {
        self.check()?;
        let address = &self.address;
        require_text(&address.address_line_1, "Address line 1 is required")?;
        require_text(&address.town_city, "Town city is required")?;
        require_text(&address.post_zip_code, "Post zip code is required")?;
        require_text(&address.country, "Country is required")
    }
}

impl Rules for Inventory {
    fn check(&self) -> Result<(), ServiceError> {
        if self.quantity < 0 {
            return fail("Quantity cannot be negative");
        }
        Ok(())
    }
}

impl Rules for User {
    fn check(&self) -> Result<(), ServiceError> {
        require_text(&self.first_name, "First name is required")?;
        require_text(&self.last_name, "Last name is required")?;
        require_id(&self.company_id, "Company ID is required")
    }
}

/// Checked after the handler assigns `id` and `owner`.
impl Rules for Company {
    fn check(&self) -> Result<(), ServiceError> {
        require_text(&self.name, "Company name is required")?;
        require_text(&self.industry, "Industry is required")?;
        require_id(&self.id, "Company ID is required")?;
        require_id(&self.owner, "Owner is required")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Address;
    use assert_matches::assert_matches;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn message(result: Result<(), ServiceError>) -> String {
        match result {
            Err(ServiceError::ValidationError(message)) => message,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    fn product(name: &str, price: Decimal) -> Product {
        Product {
            name: name.into(),
            price,
            ..Default::default()
        }
    }

    #[rstest]
    #[case(product("", dec!(0)), "Product name is required")]
    #[case(product("   ", dec!(5)), "Product name is required")]
    #[case(product("Mug", dec!(0)), "Price must be greater than 0")]
    #[case(product("Mug", dec!(-1.50)), "Price must be greater than 0")]
    fn product_rules_report_first_violation(#[case] input: Product, #[case] expected: &str) {
        assert_eq!(message(input.check()), expected);
    }

    #[test]
    fn valid_product_passes() {
        assert_matches!(product("Mug", dec!(4.99)).check(), Ok(()));
    }

    #[test]
    fn sku_rules_run_in_order() {
        let mut sku = Sku::default();
        assert_eq!(message(sku.check()), "SKU code is required");

        sku.code = "MUG-BLUE".into();
        assert_eq!(message(sku.check()), "Price must be greater than 0");

        sku.price = dec!(6);
        assert_eq!(message(sku.check()), "Product ID is required");

        sku.product_id = Uuid::new_v4();
        assert_matches!(sku.check(), Ok(()));
    }

    #[test]
    fn barcode_defaults_its_name_then_requires_value_and_sku() {
        let barcode = Barcode::default().with_default_name();
        assert_eq!(barcode.name, DEFAULT_BARCODE_NAME);
        assert_eq!(message(barcode.check()), "Barcode value is required");

        let named = Barcode {
            name: "Outer carton".into(),
            value: "5012345678900".into(),
            ..Default::default()
        }
        .with_default_name();
        assert_eq!(named.name, "Outer carton");
        assert_eq!(message(named.check()), "SKU ID is required");
    }

    #[test]
    fn warehouse_update_requires_address_fields() {
        let mut warehouse = Warehouse {
            name: "Depot".into(),
            ..Default::default()
        };
        assert_matches!(warehouse.check(), Ok(()));
        assert_eq!(message(warehouse.check_update()), "Address line 1 is required");

        warehouse.address = Address {
            address_line_1: "1 Quay".into(),
            town_city: "Hull".into(),
            post_zip_code: "HU1".into(),
            ..Default::default()
        };
        assert_eq!(message(warehouse.check_update()), "Country is required");

        warehouse.address.country = "UK".into();
        assert_matches!(warehouse.check_update(), Ok(()));
    }

    #[rstest]
    #[case(-1, false)]
    #[case(0, true)]
    #[case(250, true)]
    fn inventory_quantity_is_non_negative(#[case] quantity: i64, #[case] ok: bool) {
        let inventory = Inventory {
            quantity,
            ..Default::default()
        };
        assert_eq!(inventory.check().is_ok(), ok);
    }

    #[test]
    fn user_and_company_rules() {
        let user = User {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            ..Default::default()
        };
        assert_eq!(message(user.check()), "Company ID is required");

        let company = Company {
            name: "Acme".into(),
            ..Default::default()
        };
        assert_eq!(message(company.check()), "Industry is required");

        let company = Company {
            name: "Acme".into(),
            industry: "Retail".into(),
            id: Uuid::new_v4(),
            owner: Uuid::new_v4(),
            ..Default::default()
        };
        assert_matches!(company.check(), Ok(()));
    }

    #[test]
    fn sku_attribute_and_category_rules() {
        let link = SkuAttribute {
            attribute_id: Uuid::new_v4(),
            ..Default::default()
        };
        assert_eq!(message(link.check()), "Attribute value is required");
        assert_eq!(
            message(Category::default().check()),
            "Category name is required"
        );
        assert_eq!(
            message(Attribute::default().check()),
            "Attribute name is required"
        );
    }
}
