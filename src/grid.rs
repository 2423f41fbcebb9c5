use crate::agent::{Agent, Kind};

/// One buffer of the double-buffered ocean. During a tick the scheduler reads
/// the committed grid and agents write themselves into a fresh one; outside a
/// tick this is the sole owner of every live agent.
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Option<Agent>>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<&Agent> {
        self.cells[self.index(x, y)].as_ref()
    }

    #[inline]
    pub fn is_empty(&self, x: usize, y: usize) -> bool {
        self.cells[self.index(x, y)].is_none()
    }

    /// Writes an agent at its own coordinates, replacing any occupant. Claim
    /// checks (`is_empty`) are the caller's responsibility; unconditional
    /// self-writes and capture moves overwrite by design of the tick contract.
    pub fn place(&mut self, agent: Agent) {
        let index = self.index(agent.x, agent.y);
        self.cells[index] = Some(agent);
    }

    /// Flags the occupant for removal. The flag is honored at the end of the
    /// tick when this buffer is dropped; until then the agent stays visible
    /// as removed so later agents in the scan skip it.
    pub fn mark_removed(&mut self, x: usize, y: usize) {
        let index = self.index(x, y);
        if let Some(agent) = self.cells[index].as_mut() {
            agent.removed = true;
        }
    }

    /// Range-checked neighbor computation. `None` means "no valid move that
    /// direction", a normal outcome rather than an error.
    #[inline]
    pub fn offset(&self, x: usize, y: usize, dx: i32, dy: i32) -> Option<(usize, usize)> {
        let nx = x as i64 + dx as i64;
        let ny = y as i64 + dy as i64;
        if nx < 0 || ny < 0 || nx >= self.width as i64 || ny >= self.height as i64 {
            return None;
        }
        Some((nx as usize, ny as usize))
    }

    /// Nearest live agent of `kind` under Manhattan distance. Full row-major
    /// scan; ties resolve to the first cell found in scan order. Invoked
    /// lazily by fauna that hold no valid target, not every tick.
    pub fn nearest(&self, kind: Kind, from_x: usize, from_y: usize) -> Option<(usize, usize)> {
        let mut best: Option<(usize, usize)> = None;
        let mut best_dist = usize::MAX;
        for y in 0..self.height {
            for x in 0..self.width {
                let Some(agent) = self.get(x, y) else { continue };
                if agent.removed || agent.kind() != kind {
                    continue;
                }
                let dist = x.abs_diff(from_x) + y.abs_diff(from_y);
                if dist < best_dist {
                    best_dist = dist;
                    best = Some((x, y));
                }
            }
        }
        best
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            width: self.width,
            height: self.height,
            cells: self
                .cells
                .iter()
                .map(|cell| cell.as_ref().map(Agent::kind))
                .collect(),
        }
    }

    /// (flora, foragers, hunters) currently alive.
    pub fn population_counts(&self) -> (usize, usize, usize) {
        let mut flora = 0;
        let mut foragers = 0;
        let mut hunters = 0;
        for agent in self.cells.iter().flatten() {
            match agent.kind() {
                Kind::Flora => flora += 1,
                Kind::Forager => foragers += 1,
                Kind::Hunter => hunters += 1,
                Kind::Substrate => {}
            }
        }
        (flora, foragers, hunters)
    }
}

/// Read-only view handed to the renderer: per cell, occupied-by-kind or
/// empty. Nothing in the engine depends on what is drawn from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    width: usize,
    height: usize,
    cells: Vec<Option<Kind>>,
}

impl Snapshot {
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Kind> {
        self.cells[y * self.width + x]
    }

    pub fn iter_occupied(&self) -> impl Iterator<Item = (usize, usize, Kind)> + '_ {
        self.cells.iter().enumerate().filter_map(|(index, cell)| {
            cell.map(|kind| (index % self.width, index / self.width, kind))
        })
    }
}
