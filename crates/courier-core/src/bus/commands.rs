//! Command binding and dispatch shared by `LayeredBus` and `CombinedBus`.

use std::sync::Arc;

use tracing::warn;

use crate::config::{BusConfig, DuplicateCommandPolicy, UnhandledCommandPolicy};
use crate::error::BusError;
use crate::registry::{MessageKey, Registration, Registry, Single};
use crate::typed::{Command, CommandHandler, HandlerAdapter};

/// Bind `handler` to `T`. The first handler type bound to a command stays bound.
pub(crate) fn bind<T, H>(
    registry: &Registry<Single>,
    config: &BusConfig,
    handler: Arc<H>,
) -> Result<Registration, BusError>
where
    T: Command,
    H: CommandHandler<T> + 'static,
{
    let outcome = registry.insert(Arc::new(HandlerAdapter::<T, H>::for_command(handler)))?;

    let Registration::Occupied { existing } = outcome else {
        return Ok(outcome);
    };

    let command = std::any::type_name::<T>();
    let rejected = std::any::type_name::<H>();
    match config.duplicate_commands {
        DuplicateCommandPolicy::Ignore => {
            warn!(
                command,
                existing = existing.name(),
                rejected,
                "command already has a handler; keeping the first one"
            );
            Ok(outcome)
        }
        DuplicateCommandPolicy::Reject => Err(BusError::DuplicateCommandHandler {
            command,
            existing: existing.name(),
            rejected,
        }),
    }
}

/// Run the handler bound to the command's runtime type.
///
/// Returns `Ok(false)` when nothing is bound and the policy is `Drop`.
pub(crate) fn dispatch(
    registry: &Registry<Single>,
    config: &BusConfig,
    command: &dyn Command,
) -> Result<bool, BusError> {
    let key = MessageKey::of_value(command);
    let handled = registry.dispatch(key, command.as_any())? > 0;

    if !handled && config.unhandled_commands == UnhandledCommandPolicy::Reject {
        return Err(BusError::NoCommandHandler {
            command: key.name(),
        });
    }
    Ok(handled)
}
