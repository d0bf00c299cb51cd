//! Fragment systems: распад, subdue, окно уязвимости, следование за ядром

use bevy::prelude::*;

use crate::boss::controller::BossController;
use crate::boss::events::PhaseChanged;
use crate::combat::damage::{ContactDamage, Dead, EntityDied, EntitySubdued};
use crate::components::{Body, Combatant, Hurtbox, MotionIntent};
use crate::fragments::assembly::{Fragment, FragmentAssembly};
use crate::logger;

/// Событие: окно уязвимости ядра открылось / закрылось
#[derive(Event, Debug, Clone, PartialEq)]
pub struct VulnerabilityWindow {
    pub boss: Entity,
    pub open: bool,
}

type FragmentParts<'w, 's> = Query<
    'w,
    's,
    (
        &'static mut Combatant,
        &'static mut BossController,
        &'static mut Hurtbox,
        &'static mut MotionIntent,
        Option<&'static mut ContactDamage>,
    ),
    With<Fragment>,
>;

type CoreParts<'w, 's> = Query<
    'w,
    's,
    (
        &'static mut FragmentAssembly,
        &'static mut BossController,
        &'static mut Hurtbox,
    ),
    (Without<Fragment>, Without<Dead>),
>;

/// Система: PhaseChanged(split) → фрагменты активны, ядро неуязвимо
pub fn activate_fragments_on_split(
    mut phase_events: EventReader<PhaseChanged>,
    mut cores: CoreParts,
    mut fragments: FragmentParts,
) {
    for event in phase_events.read() {
        if !event.split {
            continue;
        }
        let Ok((assembly, _, mut core_hurtbox)) = cores.get_mut(event.boss) else {
            logger::log_warning(&format!("Split phase on {:?} without FragmentAssembly", event.boss));
            continue;
        };
        core_hurtbox.enabled = false;

        for fragment in assembly.fragments() {
            if let Ok((_, mut controller, mut hurtbox, _, contact)) = fragments.get_mut(*fragment) {
                controller.activate();
                hurtbox.enabled = true;
                if let Some(mut contact) = contact {
                    contact.rearm();
                }
            }
        }
        logger::log_info(&format!(
            "Boss {:?} splits into {} fragments",
            event.boss,
            assembly.fragments().len()
        ));
    }
}

/// Система: фрагмент усмирён → выключить; все усмирены → окно уязвимости
pub fn handle_fragment_subdued(
    mut subdued_events: EventReader<EntitySubdued>,
    links: Query<&Fragment>,
    mut fragments: FragmentParts,
    mut cores: CoreParts,
    mut window_events: EventWriter<VulnerabilityWindow>,
) {
    for event in subdued_events.read() {
        let Ok(link) = links.get(event.entity) else {
            continue;
        };

        if let Ok((_, mut controller, mut hurtbox, mut motion, contact)) = fragments.get_mut(event.entity) {
            controller.deactivate();
            hurtbox.enabled = false;
            *motion = MotionIntent::Stop;
            if let Some(mut contact) = contact {
                contact.disarm();
            }
        }

        let Ok((mut assembly, mut core, mut core_hurtbox)) = cores.get_mut(link.assembly) else {
            continue;
        };

        let opened = assembly.notify_fragment_subdued(|fragment| {
            fragments
                .get(fragment)
                .is_ok_and(|(combatant, ..)| combatant.is_subdued())
        });
        logger::log(&format!(
            "Fragment {:?} subdued ({}/{})",
            event.entity,
            assembly.subdued_count(),
            assembly.fragments().len()
        ));

        if opened {
            core_hurtbox.enabled = true;
            core.begin_reform();
            logger::log_info(&format!(
                "Boss {:?} reassembled: vulnerable for {}s",
                link.assembly,
                assembly.window_remaining()
            ));
            window_events.send(VulnerabilityWindow {
                boss: link.assembly,
                open: true,
            });
        }
    }
}

/// Система: отсчёт окна; по закрытию фрагменты восстанавливаются, ядро снова распадается
pub fn tick_vulnerability_windows(
    mut cores: Query<
        (
            Entity,
            &mut FragmentAssembly,
            &mut BossController,
            &mut Hurtbox,
            &Body,
            Option<&mut ContactDamage>,
        ),
        (Without<Fragment>, Without<Dead>),
    >,
    mut fragments: Query<
        (
            &Fragment,
            &mut Combatant,
            &mut BossController,
            &mut Hurtbox,
            Option<&mut ContactDamage>,
            &mut Body,
        ),
        With<Fragment>,
    >,
    time: Res<Time<Fixed>>,
    mut window_events: EventWriter<VulnerabilityWindow>,
) {
    let delta = time.delta_secs();

    for (entity, mut assembly, mut core, mut core_hurtbox, core_body, core_contact) in cores.iter_mut() {
        if !assembly.tick(delta) {
            continue;
        }

        for fragment in assembly.fragments() {
            let Ok((link, mut combatant, mut controller, mut hurtbox, contact, mut body)) = fragments.get_mut(*fragment)
            else {
                continue;
            };
            combatant.reset();
            controller.activate();
            hurtbox.enabled = true;
            if let Some(mut contact) = contact {
                contact.rearm();
            }
            body.position = core_body.position + link.offset;
            body.velocity = Vec2::ZERO;
        }

        // Атака ядра обрывается вместе с окном
        core_hurtbox.enabled = false;
        if let Some(mut contact) = core_contact {
            if contact.single_hit {
                contact.disarm();
            }
        }
        core.resplit();

        logger::log_info(&format!("Boss {:?} vulnerability window closed, fragments restored", entity));
        window_events.send(VulnerabilityWindow {
            boss: entity,
            open: false,
        });
    }
}

/// Система: смерть ядра выключает все фрагменты
pub fn release_fragments_on_core_death(
    mut died_events: EventReader<EntityDied>,
    assemblies: Query<&FragmentAssembly>,
    mut fragments: FragmentParts,
) {
    for event in died_events.read() {
        let Ok(assembly) = assemblies.get(event.entity) else {
            continue;
        };

        for fragment in assembly.fragments() {
            if let Ok((_, mut controller, mut hurtbox, mut motion, contact)) = fragments.get_mut(*fragment) {
                controller.deactivate();
                hurtbox.enabled = false;
                *motion = MotionIntent::Stop;
                if let Some(mut contact) = contact {
                    contact.disarm();
                }
            }
        }
        logger::log_info(&format!("Boss {:?} destroyed, fragments released", event.entity));
    }
}

/// Система: неактивные фрагменты держатся в собранном виде на ядре
pub fn follow_parent(
    cores: Query<&Body, Without<Fragment>>,
    mut fragments: Query<(&Fragment, &BossController, &mut Body, &mut MotionIntent), With<Fragment>>,
) {
    for (link, controller, mut body, mut motion) in fragments.iter_mut() {
        if controller.is_active() {
            continue;
        }
        let Ok(core) = cores.get(link.assembly) else {
            continue;
        };
        body.position = core.position + link.offset;
        body.velocity = Vec2::ZERO;
        *motion = MotionIntent::Stop;
    }
}
