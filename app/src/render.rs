use forage_engine::{ecs::Pool, math::Mat3, orientation::Orientation};

use crate::components::{Components, Sprite};

/// One sprite to draw this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub sprite_id: u32,
    /// Maps texture pixels to world space, with the sprite origin landing on the entity position.
    pub transform: Mat3,
    pub color: [f32; 3],
}

impl DrawCommand {
    pub fn new(sprite: &Sprite, orientation: &Orientation) -> Self {
        let pivot = Mat3::from_orientation(-sprite.origin, 0.0, 1.0);
        Self {
            sprite_id: sprite.sprite_id,
            transform: *orientation.transform() * Mat3::from_scale(sprite.scale) * pivot,
            color: sprite.color,
        }
    }
}

/// A headless renderer collecting the draw commands of each frame.
#[derive(Debug, Default)]
pub struct Renderer {
    commands: Vec<DrawCommand>,
    frames: u64,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame, discarding the previous one's commands.
    pub fn begin_frame(&mut self) {
        self.commands.clear();
        self.frames += 1;
    }

    /// Queue one command per entity with a sprite and an orientation.
    pub fn draw(&mut self, pool: &mut Pool<Components>) {
        let commands = &mut self.commands;
        pool.run_system::<(&Sprite, &Orientation), _>(|_, (sprite, orientation)| {
            commands.push(DrawCommand::new(sprite, orientation));
        });
    }

    #[inline]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use forage_engine::math::Vec2;

    use super::*;
    use crate::{food, npc};

    /// Where a texture pixel of `command` lands in the world.
    fn project(command: &DrawCommand, pixel: Vec2) -> Vec2 {
        command.transform.transform_point(pixel)
    }

    #[test]
    fn origin_lands_on_position() {
        // Given
        let mut pool = Pool::<Components>::new();
        let _npc = npc::spawn(&mut pool, Vec2::new(2.0, 0.0), 0.0);
        let mut renderer = Renderer::new();

        // When
        renderer.begin_frame();
        renderer.draw(&mut pool);

        // Then
        let [command] = renderer.commands() else {
            panic!("expected one command, got {:?}", renderer.commands());
        };
        assert_eq!(command.sprite_id, 0);
        let center = project(command, Vec2::new(64.0, 64.0));
        let edge = project(command, Vec2::new(128.0, 64.0));
        assert!((center - Vec2::new(2.0, 0.0)).norm() < 1e-5);
        assert!((edge - Vec2::new(2.0 + npc::RADIUS, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn frames_start_empty() {
        // Given
        let mut pool = Pool::<Components>::new();
        let _food = food::spawn(&mut pool, Vec2::ZERO, 0.1);
        let _npc = npc::spawn(&mut pool, Vec2::new(3.0, 0.0), 0.0);
        let mut renderer = Renderer::new();
        renderer.begin_frame();
        renderer.draw(&mut pool);

        // When
        renderer.begin_frame();
        renderer.draw(&mut pool);

        // Then
        assert_eq!(renderer.frames(), 2);
        let ids: Vec<u32> = renderer.commands().iter().map(|c| c.sprite_id).collect();
        assert_eq!(ids, vec![1, 0]);
    }
}
