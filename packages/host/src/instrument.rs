//! Instrumentation bundles handed to the assembler.

use serde::Serialize;

use sandbench_assemble::Instrumentation;
use sandbench_mockapi::{ChaosConfig, MockDb};

use crate::ExerciseManifest;

/// Document-side console bridge source.
const CONSOLE_BRIDGE: &str = include_str!("../assets/console_bridge.js");

/// Document-side fetch router source.
const FETCH_ROUTER: &str = include_str!("../assets/fetch_router.js");

/// Init data serialized into the bootstrap block.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BootstrapPayload<'a> {
    exercise_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_seed: Option<&'a MockDb>,
    chaos: &'a ChaosConfig,
}

/// Build the instrumentation bundle for one exercise: the console bridge,
/// one explicit `sandbenchBootstrap(...)` call carrying the serialized init
/// data, and the fetch router, in the order the assembler will inject them.
pub fn instrumentation_for(manifest: &ExerciseManifest) -> Instrumentation {
    let seed = manifest.api_seed();
    let chaos = manifest.chaos();
    let payload = BootstrapPayload {
        exercise_id: &manifest.id,
        api_seed: seed.as_ref(),
        chaos: &chaos,
    };

    let bootstrap = match serde_json::to_string(&payload) {
        Ok(json) => Some(format!("sandbenchBootstrap({});", json)),
        Err(error) => {
            // Payloads are plain data; a failure here means a malformed seed.
            log::warn!("could not serialize bootstrap payload: {}", error);
            None
        }
    };

    Instrumentation {
        console_bridge: CONSOLE_BRIDGE.to_string(),
        bootstrap,
        mock_layer: FETCH_ROUTER.to_string(),
    }
}
