//! Property-based tests for pagination, page parsing and the warehouse
//! address mapping.

use inventory_manager_api::{
    common::{pagination, parse_page},
    models::{Address, Warehouse, WarehouseRow},
    store::Record,
};
use proptest::prelude::*;
use uuid::Uuid;

fn text_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 ,.'-]{0,40}"
}

fn address_strategy() -> impl Strategy<Value = Address> {
    (
        text_strategy(),
        proptest::option::of(text_strategy()),
        text_strategy(),
        text_strategy(),
        "[A-Z0-9 ]{0,10}",
        text_strategy(),
    )
        .prop_map(
            |(address_line_1, address_line_2, town_city, state_county, post_zip_code, country)| {
                Address {
                    address_line_1,
                    address_line_2,
                    town_city,
                    state_county,
                    post_zip_code,
                    country,
                }
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn pages_are_contiguous_and_sized(page in 1u64..10_000, size in 1u64..1_000) {
        let (start, end) = pagination(page, size);
        prop_assert_eq!(end - start + 1, size);
        prop_assert_eq!(start, (page - 1) * size);

        let (next_start, _) = pagination(page + 1, size);
        prop_assert_eq!(next_start, end + 1);
    }

    #[test]
    fn non_numeric_pages_fall_back_to_the_first(raw in "[^0-9]*") {
        prop_assert_eq!(parse_page(Some(&raw)), 1);
        prop_assert_eq!(pagination(parse_page(Some(&raw)), 10), (0, 9));
    }

    #[test]
    fn numeric_pages_parse(page in 1u64..1_000_000) {
        prop_assert_eq!(parse_page(Some(&page.to_string())), page);
    }

    #[test]
    fn address_survives_flattening(address in address_strategy(), name in text_strategy()) {
        let warehouse = Warehouse {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name,
            address: address.clone(),
            ..Warehouse::default()
        };

        let row: WarehouseRow = warehouse.clone().into_row();
        let json = serde_json::to_value(&row).unwrap();
        let decoded: WarehouseRow = serde_json::from_value(json).unwrap();
        let restored = Warehouse::from_row(decoded);

        prop_assert_eq!(&restored.address, &address);
        prop_assert_eq!(restored, warehouse);
    }
}

#[test]
fn documented_page_ranges() {
    assert_eq!(pagination(1, 10), (0, 9));
    assert_eq!(pagination(3, 10), (20, 29));
    assert_eq!(pagination(0, 10), (0, 9));
}
