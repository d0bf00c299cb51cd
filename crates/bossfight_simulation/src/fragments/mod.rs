//! Fragments module: составной босс (Obelok)
//!
//! Фаза 2 ядра: распад на N фрагментов с собственными контроллерами.
//! Все фрагменты усмирены → ядро падает и уязвимо reassemble_duration секунд,
//! затем фрагменты восстанавливаются и ядро снова распадается.

use bevy::prelude::*;

use crate::{configure_simulation_sets, SimulationSet};

pub mod assembly;
pub mod systems;


pub use assembly::{Fragment, FragmentAssembly};
pub use systems::VulnerabilityWindow;

/// Fragments Plugin
///
/// Порядок выполнения (FixedUpdate, SimulationSet::Aftermath):
/// 1. activate_fragments_on_split
/// 2. handle_fragment_subdued → окно открывается
/// 3. tick_vulnerability_windows → окно закрывается
/// 4. release_fragments_on_core_death
/// 5. follow_parent
pub struct FragmentsPlugin;

impl Plugin for FragmentsPlugin {
    fn build(&self, app: &mut App) {
        configure_simulation_sets(app);

        app.add_event::<VulnerabilityWindow>();

        app.add_systems(
            FixedUpdate,
            (
                systems::activate_fragments_on_split,
                systems::handle_fragment_subdued,
                systems::tick_vulnerability_windows,
                systems::release_fragments_on_core_death,
                systems::follow_parent,
            )
                .chain()
                .in_set(SimulationSet::Aftermath),
        );
    }
}
