use forage_engine::{
    collision::CollisionBody,
    ecs::{EntityType, EntityTypeId},
    math::Vec2,
    orientation::Orientation,
    register_components,
};
use forage_macros::Component;

/// Tags an entity with its type so generic passes (the entity finder) can tell kinds apart.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Label {
    pub entity_type: EntityTypeId,
}

impl Label {
    pub const fn of<E: EntityType>() -> Self {
        Self {
            entity_type: E::ID,
        }
    }
}

impl Default for Label {
    fn default() -> Self {
        Self {
            entity_type: EntityTypeId::new(0),
        }
    }
}

/// What the renderer draws for an entity.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct Sprite {
    pub sprite_id: u32,
    /// Pivot in texture pixels.
    pub origin: Vec2,
    pub scale: f32,
    pub color: [f32; 3],
}

/// Movement, energy and inventory of an NPC.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Agent {
    pub velocity: Vec2,
    pub speed: f32,
    pub energy: f32,
    pub max_energy: f32,
    pub food_in_inventory: f32,
    pub inventory_capacity: f32,
    pub sight_radius: f32,
}

/// Energy gained per unit of food eaten.
pub const ENERGY_PER_FOOD: f32 = 100.0;

impl Agent {
    /// Free room in the inventory.
    #[inline]
    pub fn inventory_space(&self) -> f32 {
        self.inventory_capacity - self.food_in_inventory
    }

    /// Eat from the inventory until energy is full or the inventory is empty. Returns the food
    /// eaten.
    pub fn eat_from_inventory(&mut self) -> f32 {
        if self.food_in_inventory <= 0.0 || self.energy >= self.max_energy {
            return 0.0;
        }
        let amount = (self.food_in_inventory * ENERGY_PER_FOOD).min(self.max_energy - self.energy)
            / ENERGY_PER_FOOD;
        self.energy += amount * ENERGY_PER_FOOD;
        self.food_in_inventory -= amount;
        amount
    }
}

impl Default for Agent {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            speed: 1.5,
            energy: 100.0,
            max_energy: 100.0,
            food_in_inventory: 0.0,
            inventory_capacity: 1.0,
            sight_radius: 5.0,
        }
    }
}

/// How much food a food entity holds.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct Nutrition {
    pub value: f32,
}

register_components!(pub Components {
    Label,
    CollisionBody,
    Orientation,
    Sprite,
    Agent,
    Nutrition,
});
