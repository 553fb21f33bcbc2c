use super::*;
use crate::types::TileCode;

impl PlayField {
    /// Consumes whatever pickup sits on the player's tile.
    pub(super) fn resolve_pickup(&mut self, rules: &GameRules, events: &mut Vec<TickEvent>) {
        let (tile_x, tile_y) = self.player.tile(&self.grid);
        let tile = self.grid.consume(tile_x, tile_y);
        let points = match tile {
            TileCode::SmallPickup => rules.small_pickup_score,
            TileCode::PowerPickup => rules.power_pickup_score,
            TileCode::Empty | TileCode::Wall => return,
        };
        self.score = self.score.saturating_add(points);
        events.push(TickEvent::PickupConsumed {
            tile_x,
            tile_y,
            tile,
            points,
        });

        if tile == TileCode::PowerPickup && rules.frightened_ticks > 0 {
            for pursuer in &mut self.pursuers {
                pursuer.set_frightened(rules.frightened_ticks);
            }
            events.push(TickEvent::PursuersFrightened {
                ticks: rules.frightened_ticks,
            });
        }
    }

    /// Checks player/pursuer overlap in pursuer order. Returns true as soon as
    /// a non-frightened pursuer touches the player; later pursuers are not
    /// checked that tick.
    pub(super) fn resolve_contacts(
        &mut self,
        rules: &GameRules,
        events: &mut Vec<TickEvent>,
    ) -> bool {
        for idx in 0..self.pursuers.len() {
            if !self.player.overlaps(&self.pursuers[idx].body) {
                continue;
            }
            if self.pursuers[idx].mode == PursuerMode::Frightened {
                self.pursuers[idx].reset_to_spawn();
                self.score = self.score.saturating_add(rules.catch_score);
                events.push(TickEvent::PursuerCaught {
                    pursuer: idx,
                    points: rules.catch_score,
                });
            } else {
                events.push(TickEvent::PlayerCaught { pursuer: idx });
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{GameRules, PlayerSpec, SessionConfig};
    use crate::engine::build_field;
    use crate::layout::Layout;
    use crate::types::{TickEvent, TileCode};

    fn field_on(rows: &[&str], x: f64, y: f64) -> super::PlayField {
        build_field(&SessionConfig {
            tile_size: 30.0,
            layout: Layout::Rows {
                rows: rows.iter().map(|r| r.to_string()).collect(),
            },
            player: PlayerSpec { x, y, speed: 2.0 },
            pursuers: Vec::new(),
            rules: GameRules::default(),
        })
        .expect("test config is valid")
    }

    #[test]
    fn pickup_uses_tile_containing_player() {
        // (59.9, 45) still lies in tile (1, 1).
        let mut field = field_on(&["####", "#.o#", "####"], 59.9, 45.0);
        let mut events = Vec::new();
        field.resolve_pickup(&GameRules::default(), &mut events);
        assert_eq!(field.score, 10);
        assert_eq!(field.grid.tile_at(1, 1), TileCode::Empty);
        assert_eq!(field.grid.tile_at(2, 1), TileCode::PowerPickup);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn repeated_resolution_scores_once() {
        let mut field = field_on(&["####", "#.o#", "####"], 45.0, 45.0);
        let mut events = Vec::new();
        field.resolve_pickup(&GameRules::default(), &mut events);
        field.resolve_pickup(&GameRules::default(), &mut events);
        assert_eq!(field.score, 10);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn power_pickup_without_pursuers_still_scores() {
        let mut field = field_on(&["####", "#.o#", "####"], 75.0, 45.0);
        let mut events = Vec::new();
        field.resolve_pickup(&GameRules::default(), &mut events);
        assert_eq!(field.score, 50);
        assert_eq!(events[1], TickEvent::PursuersFrightened { ticks: 300 });
        assert!(!field.resolve_contacts(&GameRules::default(), &mut events));
    }
}
