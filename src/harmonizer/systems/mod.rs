// src/harmonizer/systems/mod.rs
pub mod editing;
pub mod files;
pub mod navigation;
pub mod template;
pub mod validation;

use bevy::prelude::*;
use std::any;

use super::events::HarmonizerFeedback;

/// Carries an event produced off the main thread until `forward_events`
/// writes it.
#[derive(Component)]
pub struct SendEvent<E: Event> {
    pub event: E,
}

pub fn forward_events<E: Event + Clone + std::fmt::Debug>(
    mut commands: Commands,
    mut writer: EventWriter<E>,
    query: Query<(Entity, &SendEvent<E>)>,
    mut event_type_name: Local<String>,
) {
    if event_type_name.is_empty() {
        *event_type_name = any::type_name::<E>()
            .rsplit("::")
            .next()
            .unwrap_or("UnknownEvent")
            .to_string();
    }

    let mut count = 0;
    for (entity, send_event_component) in query.iter() {
        count += 1;
        trace!(
            "Forwarding event type '{}' #{}: {:?}",
            *event_type_name,
            count,
            send_event_component.event
        );
        writer.write(send_event_component.event.clone());
        commands.entity(entity).despawn();
    }

    if count > 0 {
        debug!("Forwarded {} instance(s) of event type '{}'.", count, *event_type_name);
    }
}

pub(crate) fn send_feedback(
    writer: &mut EventWriter<HarmonizerFeedback>,
    grid: &str,
    message: impl Into<String>,
    is_error: bool,
) {
    let message = message.into();
    if is_error {
        error!("[{}] {}", grid, message);
    } else {
        info!("[{}] {}", grid, message);
    }
    writer.write(HarmonizerFeedback {
        grid: grid.to_string(),
        message,
        is_error,
    });
}
