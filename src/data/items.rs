use crate::shared::*;

pub const CORN_SEED: ItemId = 1;
pub const TOMATO_SEED: ItemId = 2;
pub const CORN: ItemId = 3;
pub const TOMATO: ItemId = 4;
pub const APPLE: ItemId = 5;
pub const WOOD: ItemId = 6;

pub fn starter_items() -> Vec<ItemDef> {
    let item = |id, name: &str, item_type, base_price| ItemDef {
        id,
        name: name.into(),
        item_type,
        stack_limit: 999,
        base_price,
    };
    vec![
        item(CORN_SEED, "Corn Seed", ItemType::Seed, 10.0),
        item(TOMATO_SEED, "Tomato Seed", ItemType::Seed, 12.0),
        item(CORN, "Corn", ItemType::Produce, 25.0),
        item(TOMATO, "Tomato", ItemType::Produce, 30.0),
        item(APPLE, "Apple", ItemType::Produce, 15.0),
        item(WOOD, "Wood", ItemType::Material, 5.0),
    ]
}
