//! Draw ordering.

use arbor_ecs::{ComponentFlags, ComponentId, Entity, World};

/// Sort keys of one drawable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawItem {
    pub component: ComponentId,
    pub entity: Entity,
    pub camera: bool,
    pub entity_order: u64,
    pub component_order: u64,
}

impl DrawItem {
    /// Keys of a live component.
    #[must_use]
    pub fn of(world: &World, component: ComponentId) -> Option<Self> {
        let entity = world.component_entity(component).ok()?;
        Some(Self {
            component,
            entity,
            camera: world.flags(component).contains(ComponentFlags::CAMERA),
            entity_order: world.creation_id(entity)?,
            component_order: world.component_creation_id(component)?,
        })
    }
}

/// Pluggable draw-order policy.
pub trait DrawOrder {
    /// Reorder `items` in place; the first item draws first.
    fn sort(&self, items: &mut [DrawItem]);
}

/// Cameras first, then ascending entity creation, then component creation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDrawOrder;

impl DrawOrder for DefaultDrawOrder {
    fn sort(&self, items: &mut [DrawItem]) {
        items.sort_by_key(|item| (!item.camera, item.entity_order, item.component_order));
    }
}

impl<F> DrawOrder for F
where
    F: Fn(&mut [DrawItem]),
{
    fn sort(&self, items: &mut [DrawItem]) {
        self(items);
    }
}

#[cfg(test)]
mod tests {
    use arbor_ecs::Surface;

    use super::*;

    fn item(world: &mut World, camera: bool, entity_order: u64, component_order: u64) -> DrawItem {
        let root = world.spawn(None);
        let component = world.instantiate(root, |_world: &mut World| Ok(())).unwrap();
        DrawItem {
            component: component.id(),
            entity: component.entity(),
            camera,
            entity_order,
            component_order,
        }
    }

    #[test]
    fn test_default_order_cameras_first_then_creation() {
        let mut world = World::new();
        let mut items = vec![
            item(&mut world, false, 3, 4),
            item(&mut world, false, 1, 2),
            item(&mut world, true, 5, 6),
            item(&mut world, false, 1, 1),
        ];

        DefaultDrawOrder.sort(&mut items);

        let keys: Vec<_> = items.iter().map(|i| (i.camera, i.entity_order, i.component_order)).collect();
        assert_eq!(keys, vec![(true, 5, 6), (false, 1, 1), (false, 1, 2), (false, 3, 4)]);
    }

    #[test]
    fn test_closure_order() {
        let mut world = World::new();
        let mut items = vec![item(&mut world, false, 1, 1), item(&mut world, false, 2, 2)];

        let reverse = |items: &mut [DrawItem]| items.reverse();
        reverse.sort(&mut items);

        assert_eq!(items[0].entity_order, 2);
    }
}
