use forage_engine::{
    collision::CollisionBody, orientation::Orientation, register_entities, shape,
};

use crate::components::{Agent, Components, Label, Nutrition, Sprite};

/// A wandering creature that gathers food and burns it as energy.
pub struct Npc;

/// A growing food source.
pub struct Food;

register_entities!(pub Kinds { Npc, Food });

shape!(Npc in Components { Label, CollisionBody, Orientation, Sprite, Agent });
shape!(Food in Components { Label, CollisionBody, Orientation, Sprite, Nutrition });

#[cfg(test)]
mod tests {
    use forage_engine::ecs::{EntityRegistry, EntityType, Shape};

    use super::*;

    #[test]
    fn kinds_are_ordered() {
        assert_eq!(Kinds::LEN, 2);
        assert_eq!(Npc::ID.index(), 0);
        assert_eq!(Food::ID.index(), 1);
        assert_eq!(Kinds::name(Food::ID), "Food");
    }

    #[test]
    fn shapes_list_registry_indices() {
        assert_eq!(Npc::COMPONENTS, &[0, 1, 2, 3, 4]);
        assert_eq!(Food::COMPONENTS, &[0, 1, 2, 3, 5]);
    }
}
