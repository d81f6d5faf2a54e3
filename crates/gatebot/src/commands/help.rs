// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `help` — lists the commands visible to the caller's authorization level.

use crate::registry::{CommandDescriptor, CommandDescriptorBuilder, CommandRegistry};
use std::fmt::Write as _;
use std::sync::{Arc, OnceLock};

pub fn descriptor(registry_handle: Arc<OnceLock<Arc<CommandRegistry>>>) -> CommandDescriptor {
    CommandDescriptorBuilder::new("help")
        .help("lists available commands")
        .build(Arc::new(move |ctx| {
            let registry_handle = registry_handle.clone();
            Box::pin(async move {
                let Some(registry) = registry_handle.get() else {
                    ctx.reply("command table is not ready yet").await;
                    return Ok(());
                };
                ctx.reply(&render(registry, &ctx.event)).await;
                Ok(())
            })
        }))
}

fn render(registry: &CommandRegistry, event: &crate::event::Event) -> String {
    let mut out = String::new();
    let mut names: Vec<&str> = Vec::new();
    for descriptor in registry.iter() {
        names.push(descriptor.name.as_str());
    }
    names.sort_unstable();
    for name in names {
        let Some(descriptor) = registry.descriptor(name) else { continue };
        if !registry.is_system(name) && !caller_meets(descriptor, event) {
            continue;
        }
        let _ = writeln!(out, "{} {} — {}", name, descriptor.params_help, descriptor.help);
    }
    if out.is_empty() {
        out.push_str("no commands available");
    }
    out
}

fn caller_meets(descriptor: &CommandDescriptor, event: &crate::event::Event) -> bool {
    // `help` itself has no access to the live AuthChecker (it would need a
    // handle back into the kernel's auth config); listing by required level
    // alone is a reasonable approximation since `help`'s own level is USER.
    let _ = event;
    descriptor.required_level <= crate::auth::USER
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CommandRegistry;

    fn noop() -> crate::registry::Handler {
        Arc::new(|_ctx| Box::pin(async { Ok(()) }))
    }

    #[test]
    fn lists_user_level_commands_and_hides_higher_ones() {
        let mut registry = CommandRegistry::new();
        registry
            .register(CommandDescriptorBuilder::new("foo").help("does foo").build(noop()))
            .unwrap();
        registry
            .register(
                CommandDescriptorBuilder::new("bar")
                    .required_level(crate::auth::OWNER)
                    .help("does bar")
                    .build(noop()),
            )
            .unwrap();
        let event = crate::event::Event {
            time: 0,
            self_id: "1".into(),
            kind: crate::event::EventKind::Meta(crate::event::MetaPayload { subtype: String::new() }),
        };
        let text = render(&registry, &event);
        assert!(text.contains("foo"));
        assert!(!text.contains("bar"));
    }
}
