//! Logging counterparts of fallible ECS lookups.
//!
//! A dangling aeroplane reference is a bug, but never a reason to stop the simulation.
//! These helpers log the failure with `bevy::log::error!` and let the caller skip the entity.

use std::any::type_name;
use std::fmt;

use bevy::ecs::change_detection::Mut;
use bevy::ecs::component::{Component, Mutable};
use bevy::ecs::entity::Entity;
use bevy::ecs::world::World;

/// Unwraps an `Option` or `Result`, logging and evaluating `or $never` on failure.
///
/// ```ignore
/// let kin = try_log!(world.get::<Kinematics>(plane), expect "{plane:?} has no kinematics" or return);
/// ```
#[macro_export]
macro_rules! try_log {
    (
        $expr:expr,
        expect $must:literal $(
            (
                $($must_args:expr),* $(,)?
            )
        )?
        or $never:expr
    ) => {
        {
            match $crate::try_log::TryLog::convert_or_log(
                $expr,
                format_args!($must, $($($must_args),*)?),
            ) {
                Some(value) => value,
                None => $never,
            }
        }
    }
}

pub use try_log;

/// Shorthand for [`try_log!`] with `or return`.
#[macro_export]
macro_rules! try_log_return {
    ($expr:expr, expect $must:literal $(, $($must_args:expr),*)? $(,)?) => {
        $crate::try_log!($expr, expect $must $(($($must_args),*))? or return)
    }
}

pub use try_log_return;

/// Component lookups on a [`World`] that log when the component is missing.
pub trait WorldExt {
    fn log_get<T: Component>(&self, entity: Entity) -> Option<&T>;

    fn log_get_mut<T: Component<Mutability = Mutable>>(
        &mut self,
        entity: Entity,
    ) -> Option<Mut<'_, T>>;
}

fn report_missing<T>(entity: Entity) {
    bevy::log::error!("Expected {entity:?} to have component {}", type_name::<T>());
}

impl WorldExt for World {
    fn log_get<T: Component>(&self, entity: Entity) -> Option<&T> {
        let value = self.get::<T>(entity);
        if value.is_none() {
            report_missing::<T>(entity);
        }
        value
    }

    fn log_get_mut<T: Component<Mutability = Mutable>>(
        &mut self,
        entity: Entity,
    ) -> Option<Mut<'_, T>> {
        if !self.get_entity(entity).is_ok_and(|entity| entity.contains::<T>()) {
            report_missing::<T>(entity);
            return None;
        }
        self.get_mut::<T>(entity)
    }
}

/// An expression that can be used for `$expr` in [`try_log!`](crate::try_log!).
pub trait TryLog<T> {
    /// Returns the successful result as `Some`, or logs the error with `must`.
    fn convert_or_log(this: Self, must: impl fmt::Display) -> Option<T>;
}

impl<T> TryLog<T> for Option<T> {
    fn convert_or_log(this: Self, must: impl fmt::Display) -> Option<T> {
        if this.is_none() {
            bevy::log::error!("{must}");
        }
        this
    }
}

impl<T, E: fmt::Display> TryLog<T> for Result<T, E> {
    fn convert_or_log(this: Self, must: impl fmt::Display) -> Option<T> {
        this.map_err(|err| bevy::log::error!("{must}: {err}")).ok()
    }
}
