use forage_engine::{
    collision::CollisionBody,
    ecs::{Entity, EntityRef, Pool},
    math::Vec2,
    orientation::Orientation,
};
use rand::Rng;

use crate::{
    components::{Components, Label, Nutrition, Sprite},
    entities::Food,
};

/// Food stops growing once it holds this much.
pub const MAX_NUTRITION: f32 = 2.0;

/// Largest growth per step.
pub const MAX_GROWTH: f32 = 0.001;

const SPRITE_ID: u32 = 1;
const SPRITE_ORIGIN: Vec2 = Vec2::new(64.0, 64.0);
const SPRITE_COLOR: [f32; 3] = [0.3, 0.7, 0.05];

/// Radius of a food entity holding `nutrition`.
#[inline]
pub fn radius_for(nutrition: f32) -> f32 {
    (nutrition * 0.25).sqrt()
}

/// Nutrition of freshly spawned food: `0.05 + [0, 0.15)`.
pub fn initial_nutrition<G: Rng>(rng: &mut G) -> f32 {
    0.05 + rng.gen_range(0.0..0.15)
}

pub fn spawn(pool: &mut Pool<Components>, position: Vec2, nutrition: f32) -> Entity<Food> {
    let food = pool.create_entity::<Food>();
    *food.component_mut::<Label>(pool) = Label::of::<Food>();
    *food.component_mut::<Orientation>(pool) = Orientation::new(position, 0.0, 1.0);
    *food.component_mut::<CollisionBody>(pool) = CollisionBody::of::<Food>(0.0);
    *food.component_mut::<Sprite>(pool) = Sprite {
        sprite_id: SPRITE_ID,
        origin: SPRITE_ORIGIN,
        scale: 0.0,
        color: SPRITE_COLOR,
    };
    if let Some(reference) = food.reference() {
        set_nutrition(pool, reference, nutrition);
    }
    food
}

#[inline]
pub fn nutrition(pool: &Pool<Components>, food: EntityRef<Food>) -> f32 {
    food.component::<Nutrition>(pool).value
}

/// Set the nutrition of `food`, resizing its body and sprite to match.
pub fn set_nutrition(pool: &mut Pool<Components>, food: EntityRef<Food>, value: f32) {
    food.component_mut::<Nutrition>(pool).value = value;
    let radius = radius_for(value);
    food.component_mut::<CollisionBody>(pool).radius = radius;
    food.component_mut::<Sprite>(pool).scale = radius / SPRITE_ORIGIN.x;
}

/// Grow every food entity below [`MAX_NUTRITION`] by a random amount.
pub fn grow<G: Rng>(pool: &mut Pool<Components>, rng: &mut G) {
    pool.run_system::<(&mut Nutrition, &mut CollisionBody, &mut Sprite), _>(
        |_, (nutrition, body, sprite)| {
            if nutrition.value < MAX_NUTRITION {
                nutrition.value += rng.gen_range(0.0..MAX_GROWTH);
            }
            body.radius = radius_for(nutrition.value);
            sprite.scale = body.radius / SPRITE_ORIGIN.x;
        },
    );
}
