//! Document form of transition targets.
//!
//! Every layer writes a target as either `{ state: N }` or the literal
//! `exit`. Both JSON and YAML accept this shape, unlike a newtype enum
//! variant which YAML would require as a `!state` tag.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum TargetRepr<Id> {
    State { state: Id },
    Exit(ExitMarker),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ExitMarker {
    Exit,
}

/// Wire the target enum `$target` over the state id `$id` to [`TargetRepr`].
macro_rules! target_repr {
    ($target:ident, $id:ty) => {
        impl From<$crate::target::TargetRepr<$id>> for $target {
            fn from(repr: $crate::target::TargetRepr<$id>) -> Self {
                match repr {
                    $crate::target::TargetRepr::State { state } => $target::State(state),
                    $crate::target::TargetRepr::Exit(_) => $target::Exit,
                }
            }
        }

        impl From<$target> for $crate::target::TargetRepr<$id> {
            fn from(target: $target) -> Self {
                match target {
                    $target::State(state) => $crate::target::TargetRepr::State { state },
                    $target::Exit => {
                        $crate::target::TargetRepr::Exit($crate::target::ExitMarker::Exit)
                    }
                }
            }
        }
    };
}

pub(crate) use target_repr;
