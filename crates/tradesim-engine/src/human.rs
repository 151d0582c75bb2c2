//! Terminal player.
//!
//! [`HumanPolicy`] lets a person play one country through a numbered menu
//! while a learned policy plays every other country. The person's moves are
//! also fed to the learner, so the table keeps improving during human games.
//!
//! Input is generic over [`BufRead`] and output over [`Write`] so the prompt
//! loop can be driven from tests. Invalid or out-of-range input re-prompts;
//! end of input ends the turn.

use std::io::{self, BufRead, Write};

use rand::RngCore;
use tracing::warn;
use tradesim_core::{DecisionContext, Policy, Transition};
use tradesim_types::{Action, ActionKind, ActionOutcome, Connection, CountryId, Target};
use tradesim_world::World;

/// Menu entries in display order. Entry `0` ends the turn.
const MENU: [(ActionKind, &str); 7] = [
    (ActionKind::DoNothing, "End turn"),
    (ActionKind::PurchaseMine, "Purchase mine"),
    (ActionKind::PurchaseTown, "Purchase town"),
    (ActionKind::PurchaseConnection, "Purchase connection"),
    (ActionKind::RemoveConnection, "Remove connection"),
    (ActionKind::PurchaseBlockade, "Purchase blockade"),
    (ActionKind::RemoveBlockade, "Remove blockade"),
];

/// A person at a terminal playing `human`; `others` plays everyone else.
pub struct HumanPolicy<R, W, P> {
    human: CountryId,
    input: R,
    output: W,
    others: P,
}

impl<R, W, P> HumanPolicy<R, W, P>
where
    R: BufRead,
    W: Write,
    P: Policy,
{
    /// Seat a person at `human`, reading `input` and writing `output`.
    pub const fn new(human: CountryId, input: R, output: W, others: P) -> Self {
        Self {
            human,
            input,
            output,
            others,
        }
    }

    /// Release the policy playing the other countries.
    pub fn into_inner(self) -> P {
        self.others
    }

    /// Show the country and ask for one action.
    fn ask(&mut self, ctx: &DecisionContext<'_>) -> io::Result<Action> {
        self.show_status(ctx)?;
        loop {
            for (number, (_, label)) in MENU.iter().enumerate() {
                writeln!(self.output, "  {number}) {label}")?;
            }
            let Some(choice) = self.prompt_number("Choice", MENU.len())? else {
                return Ok(Action::pass());
            };
            let Some(&(kind, label)) = MENU.get(choice) else {
                continue;
            };
            if !kind.is_targeted() {
                return Ok(Action::simple(kind));
            }

            let options = target_options(ctx.world, ctx.actor, kind);
            if options.is_empty() {
                writeln!(self.output, "No country is eligible for \"{label}\".")?;
                continue;
            }
            let listed: Vec<String> = options.iter().map(ToString::to_string).collect();
            writeln!(self.output, "Eligible countries: {}", listed.join(", "))?;
            let Some(target) = self.prompt_target(&options)? else {
                return Ok(Action::pass());
            };
            return Ok(Action::new(kind, Target::Country(target)));
        }
    }

    fn show_status(&mut self, ctx: &DecisionContext<'_>) -> io::Result<()> {
        let Ok(country) = ctx.world.country(ctx.actor) else {
            return Ok(());
        };
        writeln!(self.output)?;
        writeln!(
            self.output,
            "Turn {} | Country {} | reserve {} | power level {} | towns {} | markets {} | mines {}",
            ctx.turn.saturating_add(1),
            country.id,
            country.reserve,
            country.power_level,
            country.towns,
            country.markets,
            country.mines
        )?;
        if country.connections.is_empty() {
            writeln!(self.output, "Connections: none")?;
        } else {
            let edges: Vec<String> = country
                .connections
                .iter()
                .map(|edge| {
                    let flag = if edge.blockaded { ", blockaded" } else { "" };
                    format!("-> {} (level {}{flag})", edge.importer, edge.level)
                })
                .collect();
            writeln!(self.output, "Connections: {}", edges.join(", "))?;
        }
        let inbound: Vec<String> = ctx
            .world
            .inbound(ctx.actor)
            .iter()
            .map(|(exporter, edge)| {
                let flag = if edge.blockaded { ", blockaded" } else { "" };
                format!("<- {exporter} (level {}{flag})", edge.level)
            })
            .collect();
        if !inbound.is_empty() {
            writeln!(self.output, "Imports: {}", inbound.join(", "))?;
        }
        Ok(())
    }

    /// Ask until a number below `limit` is entered. `None` at end of input.
    fn prompt_number(&mut self, label: &str, limit: usize) -> io::Result<Option<usize>> {
        loop {
            write!(self.output, "{label} [0-{}]: ", limit.saturating_sub(1))?;
            self.output.flush()?;
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            match line.trim().parse::<usize>() {
                Ok(value) if value < limit => return Ok(Some(value)),
                _ => writeln!(
                    self.output,
                    "Please enter a number from 0 to {}.",
                    limit.saturating_sub(1)
                )?,
            }
        }
    }

    /// Ask until one of `options` is entered. `None` at end of input.
    fn prompt_target(&mut self, options: &[CountryId]) -> io::Result<Option<CountryId>> {
        loop {
            write!(self.output, "Target country: ")?;
            self.output.flush()?;
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            match line.trim().parse::<usize>().map(CountryId::new) {
                Ok(id) if options.contains(&id) => return Ok(Some(id)),
                _ => writeln!(self.output, "Not an eligible country.")?,
            }
        }
    }
}

/// Countries the human may name for a targeted `kind`.
fn target_options(world: &World, actor: CountryId, kind: ActionKind) -> Vec<CountryId> {
    let Ok(country) = world.country(actor) else {
        return Vec::new();
    };
    match kind {
        ActionKind::PurchaseConnection => world
            .others(actor)
            .into_iter()
            .filter(|&other| country.connection_to(other).is_none_or(Connection::can_upgrade))
            .collect(),
        ActionKind::RemoveConnection => country.connections.iter().map(|e| e.importer).collect(),
        ActionKind::PurchaseBlockade | ActionKind::RemoveBlockade => {
            let blockaded = kind == ActionKind::RemoveBlockade;
            world
                .inbound(actor)
                .into_iter()
                .filter(|(_, edge)| edge.blockaded == blockaded)
                .map(|(exporter, _)| exporter)
                .collect()
        }
        ActionKind::PurchaseMine | ActionKind::PurchaseTown | ActionKind::DoNothing => Vec::new(),
    }
}

impl<R, W, P> Policy for HumanPolicy<R, W, P>
where
    R: BufRead,
    W: Write,
    P: Policy,
{
    fn name(&self) -> &'static str {
        "human"
    }

    fn begin_turn(&mut self, ctx: &DecisionContext<'_>) {
        if ctx.actor != self.human {
            self.others.begin_turn(ctx);
        }
    }

    fn select(&mut self, ctx: &DecisionContext<'_>, rng: &mut dyn RngCore) -> Action {
        if ctx.actor != self.human {
            return self.others.select(ctx, rng);
        }
        match self.ask(ctx) {
            Ok(action) => action,
            Err(error) => {
                warn!(%error, "Terminal unavailable, ending turn");
                Action::pass()
            }
        }
    }

    fn observe(&mut self, transition: &Transition) {
        self.others.observe(transition);
        if transition.actor != self.human {
            return;
        }
        if let ActionOutcome::Rejected { reason } = transition.outcome {
            if let Err(error) = writeln!(self.output, "Action rejected: {reason}.") {
                warn!(%error, "Terminal unavailable, rejection not shown");
            }
        }
    }

    fn end_game(&mut self) {
        self.others.end_game();
    }
}
