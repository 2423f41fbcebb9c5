use crate::config::{FloraConfig, ForagerConfig, HunterConfig, SimulationConfig};
use crate::grid::Grid;
use crate::simulation::SimRng;
use rand::Rng;

/// Cardinal move table: down, right, left, up. The order is part of the
/// behavioral contract for the random-walk branches.
pub const CARDINALS: [(i32, i32); 4] = [(0, 1), (1, 0), (-1, 0), (0, -1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Substrate,
    Flora,
    Forager,
    Hunter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flora {
    /// Vertical offset from the originating row; never exceeds `max_height`.
    pub growth_stage: u32,
    pub origin_y: usize,
    pub max_height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Forager {
    pub hunger: u32,
    pub target: Option<(usize, usize)>,
    /// Suppresses movement on the tick right after creation.
    pub just_placed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hunter {
    pub hunger: u32,
    pub target: Option<(usize, usize)>,
    pub chasing: bool,
    /// Post-kill digestion; while positive the hunter wanders randomly
    /// instead of hunting.
    pub cooldown: u32,
    pub just_placed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Substrate,
    Flora(Flora),
    Forager(Forager),
    Hunter(Hunter),
}

/// One ocean inhabitant. Agents are plain values: the committed grid owns
/// them, and a tick moves each one into the next buffer through its own
/// transition. An agent that does not write itself into the new buffer is
/// gone; that is the death mechanism, not a special case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Agent {
    pub x: usize,
    pub y: usize,
    /// Set during a tick, honored when the old buffer is dropped. Agents
    /// already past in the scan are not revisited even if marked.
    pub removed: bool,
    pub state: State,
}

impl Agent {
    pub fn substrate(x: usize, y: usize) -> Self {
        Self {
            x,
            y,
            removed: false,
            state: State::Substrate,
        }
    }

    /// Root flora: origin is its own row, height cap drawn from the config
    /// range.
    pub fn flora_root(x: usize, y: usize, rng: &mut SimRng, config: &FloraConfig) -> Self {
        let max_height = if config.min_height < config.max_height {
            rng.gen_range(config.min_height..=config.max_height)
        } else {
            config.min_height
        };
        Self {
            x,
            y,
            removed: false,
            state: State::Flora(Flora {
                growth_stage: 0,
                origin_y: y,
                max_height,
            }),
        }
    }

    /// Sprout grown by a parent: inherits origin and cap, stage is the
    /// vertical offset from the origin row.
    pub fn flora_sprout(x: usize, y: usize, origin_y: usize, max_height: u32) -> Self {
        Self {
            x,
            y,
            removed: false,
            state: State::Flora(Flora {
                growth_stage: (origin_y - y) as u32,
                origin_y,
                max_height,
            }),
        }
    }

    pub fn forager(x: usize, y: usize, config: &ForagerConfig) -> Self {
        Self {
            x,
            y,
            removed: false,
            state: State::Forager(Forager {
                hunger: config.max_hunger,
                target: None,
                just_placed: true,
            }),
        }
    }

    pub fn hunter(x: usize, y: usize, config: &HunterConfig) -> Self {
        Self {
            x,
            y,
            removed: false,
            state: State::Hunter(Hunter {
                hunger: config.max_hunger,
                target: None,
                chasing: false,
                cooldown: 0,
                just_placed: true,
            }),
        }
    }

    #[inline]
    pub fn kind(&self) -> Kind {
        match self.state {
            State::Substrate => Kind::Substrate,
            State::Flora(_) => Kind::Flora,
            State::Forager(_) => Kind::Forager,
            State::Hunter(_) => Kind::Hunter,
        }
    }

    /// Runs this agent's transition for one tick: read the old buffer, write
    /// the new one. Consumes the agent; whatever it commits to `new` is what
    /// survives.
    pub fn update(self, old: &mut Grid, new: &mut Grid, rng: &mut SimRng, config: &SimulationConfig) {
        match self.state {
            State::Substrate => new.place(self),
            State::Flora(flora) => update_flora(self, flora, old, new),
            State::Forager(forager) => update_forager(self, forager, old, new, rng, config),
            State::Hunter(hunter) => update_hunter(self, hunter, old, new, rng, config),
        }
    }
}

/// Flora re-commits in place, then extends its column one row up when below
/// its cap and the cell above is free in both buffers. Growth is the sole
/// reproduction mechanism; flora never moves and never dies on its own.
fn update_flora(agent: Agent, flora: Flora, old: &Grid, new: &mut Grid) {
    new.place(agent);
    if flora.growth_stage >= flora.max_height {
        return;
    }
    let Some((above_x, above_y)) = old.offset(agent.x, agent.y, 0, -1) else {
        return;
    };
    if old.is_empty(above_x, above_y) && new.is_empty(above_x, above_y) {
        new.place(Agent::flora_sprout(
            above_x,
            above_y,
            flora.origin_y,
            flora.max_height,
        ));
    }
}

fn update_forager(
    mut agent: Agent,
    mut forager: Forager,
    old: &mut Grid,
    new: &mut Grid,
    rng: &mut SimRng,
    config: &SimulationConfig,
) {
    if forager.just_placed {
        forager.just_placed = false;
        agent.state = State::Forager(forager);
        new.place(agent);
        return;
    }

    let (x, y) = (agent.x, agent.y);
    let mut next_x = x;
    let mut next_y = y;
    let mut moved = false;

    // A held target must still be a live flora.
    if let Some((tx, ty)) = forager.target {
        let valid = matches!(old.get(tx, ty), Some(t) if !t.removed && t.kind() == Kind::Flora);
        if !valid {
            forager.target = None;
        }
    }
    if forager.hunger < config.forager.max_hunger && forager.target.is_none() {
        forager.target = old.nearest(Kind::Flora, x, y);
    }

    if let Some((tx, ty)) = forager.target {
        let step_x = (tx as i64 - x as i64).signum() as i32;
        let step_y = (ty as i64 - y as i64).signum() as i32;
        // Close the horizontal gap first; try vertical only if that failed.
        for (dx, dy) in [(step_x, 0), (0, step_y)] {
            if moved {
                break;
            }
            let Some((cx, cy)) = old.offset(x, y, dx, dy) else {
                continue;
            };
            match old.get(cx, cy) {
                Some(occupant) if occupant.kind() == Kind::Hunter => {
                    // Walked into a hunter's jaws.
                    old.mark_removed(x, y);
                    return;
                }
                Some(occupant) if occupant.kind() == Kind::Flora && !occupant.removed => {
                    old.mark_removed(cx, cy);
                    forager.hunger =
                        (forager.hunger + config.forager.feed_gain).min(config.forager.max_hunger);
                    forager.target = None;
                    next_x = cx;
                    next_y = cy;
                    moved = true;
                }
                None if new.is_empty(cx, cy) => {
                    next_x = cx;
                    next_y = cy;
                    moved = true;
                }
                _ => {}
            }
        }
    }

    if !moved {
        forager.hunger = forager.hunger.saturating_sub(1);
        let (dx, dy) = CARDINALS[rng.gen_range(0..CARDINALS.len())];
        if let Some((cx, cy)) = old.offset(x, y, dx, dy) {
            let hunter_there = matches!(old.get(cx, cy), Some(o) if o.kind() == Kind::Hunter);
            if !hunter_there && new.is_empty(cx, cy) {
                next_x = cx;
                next_y = cy;
            }
        }
    }

    if forager.hunger == 0 {
        old.mark_removed(x, y);
        return;
    }

    agent.x = next_x;
    agent.y = next_y;
    agent.state = State::Forager(forager);
    new.place(agent);
}

fn update_hunter(
    mut agent: Agent,
    mut hunter: Hunter,
    old: &mut Grid,
    new: &mut Grid,
    rng: &mut SimRng,
    config: &SimulationConfig,
) {
    if hunter.just_placed {
        hunter.just_placed = false;
        agent.state = State::Hunter(hunter);
        new.place(agent);
        return;
    }

    let (x, y) = (agent.x, agent.y);
    let mut next_x = x;
    let mut next_y = y;

    // Digesting: wander randomly, no hunting this tick.
    if hunter.cooldown > 0 {
        hunter.cooldown -= 1;
        hunter.hunger = hunter.hunger.saturating_sub(1);
        if hunter.hunger == 0 {
            old.mark_removed(x, y);
            return;
        }
        let (dx, dy) = CARDINALS[rng.gen_range(0..CARDINALS.len())];
        if let Some((cx, cy)) = old.offset(x, y, dx, dy) {
            if old.is_empty(cx, cy) && new.is_empty(cx, cy) {
                next_x = cx;
                next_y = cy;
            }
        }
        agent.x = next_x;
        agent.y = next_y;
        agent.state = State::Hunter(hunter);
        new.place(agent);
        return;
    }

    if hunter.chasing {
        let valid = matches!(
            hunter.target,
            Some((tx, ty)) if matches!(
                old.get(tx, ty),
                Some(t) if !t.removed && t.kind() == Kind::Forager
            )
        );
        if !valid {
            hunter.chasing = false;
            hunter.target = None;
        }
    }
    if !hunter.chasing {
        if let Some(found) = old.nearest(Kind::Forager, x, y) {
            hunter.target = Some(found);
            hunter.chasing = true;
        }
    }

    let mut moved = false;
    let mut killed = false;
    if let (true, Some((tx, ty))) = (hunter.chasing, hunter.target) {
        let step_x = (tx as i64 - x as i64).signum() as i32;
        let step_y = (ty as i64 - y as i64).signum() as i32;
        for (dx, dy) in [(step_x, 0), (0, step_y)] {
            if moved {
                break;
            }
            let Some((cx, cy)) = old.offset(x, y, dx, dy) else {
                continue;
            };
            match old.get(cx, cy) {
                Some(prey) if prey.kind() == Kind::Forager && !prey.removed => {
                    old.mark_removed(cx, cy);
                    hunter.hunger = config.hunter.max_hunger;
                    hunter.chasing = false;
                    hunter.target = None;
                    hunter.cooldown = if config.hunter.min_cooldown < config.hunter.max_cooldown {
                        rng.gen_range(config.hunter.min_cooldown..=config.hunter.max_cooldown)
                    } else {
                        config.hunter.min_cooldown
                    };
                    next_x = cx;
                    next_y = cy;
                    moved = true;
                    killed = true;
                }
                None if new.is_empty(cx, cy) => {
                    next_x = cx;
                    next_y = cy;
                    moved = true;
                }
                _ => {}
            }
        }
    }

    if !moved {
        // Idle wander when there is nothing to chase or the chase is blocked.
        let (dx, dy) = CARDINALS[rng.gen_range(0..CARDINALS.len())];
        if let Some((cx, cy)) = old.offset(x, y, dx, dy) {
            if old.is_empty(cx, cy) && new.is_empty(cx, cy) {
                next_x = cx;
                next_y = cy;
            }
        }
    }

    if !killed {
        hunter.hunger = hunter.hunger.saturating_sub(1);
    }
    if hunter.hunger == 0 {
        old.mark_removed(x, y);
        return;
    }

    agent.x = next_x;
    agent.y = next_y;
    agent.state = State::Hunter(hunter);
    new.place(agent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> SimRng {
        SimRng::seed_from_u64(7)
    }

    fn active_forager(x: usize, y: usize, hunger: u32, target: Option<(usize, usize)>) -> Agent {
        Agent {
            x,
            y,
            removed: false,
            state: State::Forager(Forager {
                hunger,
                target,
                just_placed: false,
            }),
        }
    }

    fn active_hunter(
        x: usize,
        y: usize,
        hunger: u32,
        target: Option<(usize, usize)>,
        chasing: bool,
        cooldown: u32,
    ) -> Agent {
        Agent {
            x,
            y,
            removed: false,
            state: State::Hunter(Hunter {
                hunger,
                target,
                chasing,
                cooldown,
                just_placed: false,
            }),
        }
    }

    fn forager_state(agent: &Agent) -> Forager {
        match agent.state {
            State::Forager(f) => f,
            _ => panic!("expected a forager"),
        }
    }

    fn hunter_state(agent: &Agent) -> Hunter {
        match agent.state {
            State::Hunter(h) => h,
            _ => panic!("expected a hunter"),
        }
    }

    #[test]
    fn substrate_recommits_in_place() {
        let config = SimulationConfig::default();
        let mut old = Grid::new(5, 5);
        let mut new = Grid::new(5, 5);
        let sand = Agent::substrate(2, 4);
        old.place(sand);
        sand.update(&mut old, &mut new, &mut rng(), &config);
        assert_eq!(new.get(2, 4).map(Agent::kind), Some(Kind::Substrate));
    }

    #[test]
    fn flora_sprouts_one_row_up_until_capped() {
        let mut old = Grid::new(5, 8);
        let mut new = Grid::new(5, 8);
        let root = Agent::flora_sprout(2, 6, 6, 2);
        old.place(root);
        root.update(&mut old, &mut new, &mut rng(), &SimulationConfig::default());
        assert_eq!(new.get(2, 6).map(Agent::kind), Some(Kind::Flora));
        let sprout = new.get(2, 5).copied().expect("sprout above the root");
        match sprout.state {
            State::Flora(f) => {
                assert_eq!(f.growth_stage, 1);
                assert_eq!(f.origin_y, 6);
                assert_eq!(f.max_height, 2);
            }
            _ => panic!("expected flora"),
        }
    }

    #[test]
    fn flora_at_its_cap_stops_growing() {
        let config = SimulationConfig::default();
        let mut old = Grid::new(5, 8);
        let mut new = Grid::new(5, 8);
        let tip = Agent::flora_sprout(2, 4, 6, 2);
        old.place(tip);
        tip.update(&mut old, &mut new, &mut rng(), &config);
        assert!(new.get(2, 3).is_none());
    }

    #[test]
    fn flora_needs_the_cell_above_free_in_both_buffers() {
        let config = SimulationConfig::default();
        let mut old = Grid::new(5, 8);
        let mut new = Grid::new(5, 8);
        let plant = Agent::flora_sprout(2, 6, 6, 5);
        old.place(plant);
        new.place(active_forager(2, 5, 10, None));
        plant.update(&mut old, &mut new, &mut rng(), &config);
        assert_eq!(new.get(2, 5).map(Agent::kind), Some(Kind::Forager));
    }

    #[test]
    fn flora_at_the_top_row_cannot_grow() {
        let config = SimulationConfig::default();
        let mut old = Grid::new(5, 8);
        let mut new = Grid::new(5, 8);
        let tip = Agent::flora_sprout(2, 0, 6, 19);
        old.place(tip);
        tip.update(&mut old, &mut new, &mut rng(), &config);
        assert_eq!(new.get(2, 0).map(Agent::kind), Some(Kind::Flora));
    }

    #[test]
    fn freshly_placed_forager_only_registers() {
        let config = SimulationConfig::default();
        let mut old = Grid::new(5, 5);
        let mut new = Grid::new(5, 5);
        let newborn = Agent::forager(2, 2, &config.forager);
        old.place(newborn);
        newborn.update(&mut old, &mut new, &mut rng(), &config);
        let settled = new.get(2, 2).copied().expect("registered in place");
        let state = forager_state(&settled);
        assert!(!state.just_placed);
        assert_eq!(state.hunger, config.forager.max_hunger);
    }

    #[test]
    fn forager_closes_the_horizontal_gap_first() {
        let config = SimulationConfig::default();
        let mut old = Grid::new(8, 8);
        let mut new = Grid::new(8, 8);
        let forager = active_forager(2, 2, 10, Some((5, 6)));
        old.place(forager);
        old.place(Agent::flora_sprout(5, 6, 6, 5));
        forager.update(&mut old, &mut new, &mut rng(), &config);
        let moved = new.get(3, 2).copied().expect("moved one step right");
        // Directed movement costs no hunger.
        assert_eq!(forager_state(&moved).hunger, 10);
    }

    #[test]
    fn forager_falls_back_to_vertical_when_horizontal_is_blocked() {
        let config = SimulationConfig::default();
        let mut old = Grid::new(8, 8);
        let mut new = Grid::new(8, 8);
        let forager = active_forager(2, 2, 10, Some((5, 6)));
        old.place(forager);
        old.place(Agent::flora_sprout(5, 6, 6, 5));
        old.place(Agent::substrate(3, 2));
        forager.update(&mut old, &mut new, &mut rng(), &config);
        assert_eq!(new.get(2, 3).map(Agent::kind), Some(Kind::Forager));
    }

    #[test]
    fn forager_eats_adjacent_flora_and_clears_its_target() {
        let config = SimulationConfig::default();
        let mut old = Grid::new(8, 8);
        let mut new = Grid::new(8, 8);
        let forager = active_forager(2, 2, 10, Some((3, 2)));
        old.place(forager);
        old.place(Agent::flora_sprout(3, 2, 2, 5));
        forager.update(&mut old, &mut new, &mut rng(), &config);
        assert!(old.get(3, 2).is_some_and(|a| a.removed));
        let fed = new.get(3, 2).copied().expect("moved onto the meal");
        let state = forager_state(&fed);
        assert_eq!(state.hunger, 12);
        assert_eq!(state.target, None);
    }

    #[test]
    fn feeding_never_pushes_hunger_past_its_cap() {
        let config = SimulationConfig::default();
        let mut old = Grid::new(8, 8);
        let mut new = Grid::new(8, 8);
        let forager = active_forager(2, 2, 14, Some((3, 2)));
        old.place(forager);
        old.place(Agent::flora_sprout(3, 2, 2, 5));
        forager.update(&mut old, &mut new, &mut rng(), &config);
        assert_eq!(forager_state(new.get(3, 2).unwrap()).hunger, 15);
    }

    #[test]
    fn forager_stepping_toward_a_hunter_is_eaten() {
        let config = SimulationConfig::default();
        let mut old = Grid::new(8, 8);
        let mut new = Grid::new(8, 8);
        let forager = active_forager(2, 2, 10, Some((5, 2)));
        old.place(forager);
        old.place(Agent::flora_sprout(5, 2, 2, 5));
        old.place(Agent::hunter(3, 2, &config.hunter));
        forager.update(&mut old, &mut new, &mut rng(), &config);
        assert!(old.get(2, 2).is_some_and(|a| a.removed));
        assert!(new.get(2, 2).is_none());
        assert!(new.get(3, 2).is_none());
    }

    #[test]
    fn wandering_costs_one_hunger() {
        let config = SimulationConfig::default();
        let mut old = Grid::new(8, 8);
        let mut new = Grid::new(8, 8);
        let forager = active_forager(4, 4, 10, None);
        old.place(forager);
        forager.update(&mut old, &mut new, &mut rng(), &config);
        let survivor = new
            .snapshot()
            .iter_occupied()
            .find(|(_, _, kind)| *kind == Kind::Forager)
            .expect("forager survives the tick");
        let (sx, sy, _) = survivor;
        assert_eq!(forager_state(new.get(sx, sy).unwrap()).hunger, 9);
        // Wander moves at most one cardinal step.
        assert!(sx.abs_diff(4) + sy.abs_diff(4) <= 1);
    }

    #[test]
    fn starved_forager_never_reaches_the_new_buffer() {
        let config = SimulationConfig::default();
        let mut old = Grid::new(8, 8);
        let mut new = Grid::new(8, 8);
        let forager = active_forager(4, 4, 1, None);
        old.place(forager);
        forager.update(&mut old, &mut new, &mut rng(), &config);
        assert!(old.get(4, 4).is_some_and(|a| a.removed));
        assert_eq!(new.snapshot().iter_occupied().count(), 0);
    }

    #[test]
    fn sated_forager_does_not_search_for_food() {
        let config = SimulationConfig::default();
        let mut old = Grid::new(8, 8);
        let mut new = Grid::new(8, 8);
        let forager = active_forager(4, 4, config.forager.max_hunger, None);
        old.place(forager);
        old.place(Agent::flora_sprout(0, 0, 0, 5));
        forager.update(&mut old, &mut new, &mut rng(), &config);
        let (sx, sy, _) = new
            .snapshot()
            .iter_occupied()
            .find(|(_, _, kind)| *kind == Kind::Forager)
            .unwrap();
        assert_eq!(forager_state(new.get(sx, sy).unwrap()).target, None);
    }

    #[test]
    fn cooling_down_hunter_skips_hunting() {
        let config = SimulationConfig::default();
        let mut old = Grid::new(8, 8);
        let mut new = Grid::new(8, 8);
        let hunter = active_hunter(4, 4, 10, None, false, 2);
        old.place(hunter);
        // Adjacent prey that must be ignored while digesting.
        old.place(active_forager(5, 4, 10, None));
        hunter.update(&mut old, &mut new, &mut rng(), &config);
        assert!(!old.get(5, 4).unwrap().removed);
        let (sx, sy, _) = new
            .snapshot()
            .iter_occupied()
            .find(|(_, _, kind)| *kind == Kind::Hunter)
            .unwrap();
        let state = hunter_state(new.get(sx, sy).unwrap());
        assert_eq!(state.cooldown, 1);
        assert_eq!(state.hunger, 9);
        assert!(!state.chasing);
    }

    #[test]
    fn chasing_hunter_captures_adjacent_prey_horizontally() {
        let config = SimulationConfig::default();
        let mut old = Grid::new(8, 8);
        let mut new = Grid::new(8, 8);
        let hunter = active_hunter(2, 2, 5, Some((3, 2)), true, 0);
        old.place(hunter);
        old.place(active_forager(3, 2, 10, None));
        hunter.update(&mut old, &mut new, &mut rng(), &config);
        assert!(old.get(3, 2).is_some_and(|a| a.removed));
        let fed = hunter_state(new.get(3, 2).unwrap());
        assert_eq!(fed.hunger, config.hunter.max_hunger);
        assert!(!fed.chasing);
        assert_eq!(fed.target, None);
        assert!(
            (config.hunter.min_cooldown..=config.hunter.max_cooldown).contains(&fed.cooldown)
        );
    }

    #[test]
    fn idle_hunter_acquires_the_nearest_forager() {
        let config = SimulationConfig::default();
        let mut old = Grid::new(10, 10);
        let mut new = Grid::new(10, 10);
        let hunter = active_hunter(2, 2, 10, None, false, 0);
        old.place(hunter);
        old.place(active_forager(7, 2, 10, None));
        hunter.update(&mut old, &mut new, &mut rng(), &config);
        let chaser = hunter_state(new.get(3, 2).expect("stepped toward prey"));
        assert!(chaser.chasing);
        assert_eq!(chaser.target, Some((7, 2)));
        // Closing in without a kill still costs hunger.
        assert_eq!(chaser.hunger, 9);
    }

    #[test]
    fn hunter_drops_a_stale_chase() {
        let config = SimulationConfig::default();
        let mut old = Grid::new(10, 10);
        let mut new = Grid::new(10, 10);
        let hunter = active_hunter(2, 2, 10, Some((7, 2)), true, 0);
        old.place(hunter);
        hunter.update(&mut old, &mut new, &mut rng(), &config);
        let (sx, sy, _) = new
            .snapshot()
            .iter_occupied()
            .find(|(_, _, kind)| *kind == Kind::Hunter)
            .unwrap();
        let state = hunter_state(new.get(sx, sy).unwrap());
        assert!(!state.chasing);
        assert_eq!(state.target, None);
    }

    #[test]
    fn starved_hunter_never_reaches_the_new_buffer() {
        let config = SimulationConfig::default();
        let mut old = Grid::new(8, 8);
        let mut new = Grid::new(8, 8);
        let hunter = active_hunter(4, 4, 1, None, false, 0);
        old.place(hunter);
        hunter.update(&mut old, &mut new, &mut rng(), &config);
        assert!(old.get(4, 4).is_some_and(|a| a.removed));
        assert_eq!(new.snapshot().iter_occupied().count(), 0);
    }
}
