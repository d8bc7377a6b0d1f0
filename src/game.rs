// src/game.rs
//! Партия: очередь ходов и выбор стран
//!
//! `Game` оборачивает `World` и принимает дискретные события — щелчок по
//! стране (`select_country`) и конец хода (`end_turn`). Как и `World`, каждое
//! событие возвращает новое состояние.
//!
//! Состояния: «ничего не выбрано» → «выбрана своя страна» → (ход | атака) →
//! «ничего не выбрано». Игрок жив, пока ему принадлежит хотя бы одна страна.

use rand::Rng;

use crate::error::{Error, Result};
use crate::world::{Battle, CountryId, Player, PlayerId, PlayerKind, World};

#[derive(Debug, Clone)]
pub struct Game {
    /// Игроки в порядке хода
    pub players: Vec<Player>,
    pub world: World,
    pub current_player: PlayerId,
    pub selected_country: Option<CountryId>,
    /// Номер хода, начиная с нуля; растёт на каждом `end_turn`
    pub turn: u32,
    /// Итог последней атаки (для отображения)
    pub last_battle: Option<Battle>,
}

impl Game {
    /// Новая партия: каждый игрок получает случайную свободную страну
    pub fn new<R: Rng + ?Sized>(world: &World, players: Vec<Player>, rng: &mut R) -> Result<Self> {
        let world = world.assign_players(&players, rng)?;
        Self::from_world(world, players)
    }

    /// Партия на мире, где игроки уже расставлены. Первым ходит первый игрок.
    pub fn from_world(world: World, players: Vec<Player>) -> Result<Self> {
        let first = players
            .first()
            .ok_or_else(|| Error::InvalidConfig("a game needs at least one player".into()))?;
        Ok(Self {
            current_player: first.id,
            players,
            world,
            selected_country: None,
            turn: 0,
            last_battle: None,
        })
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player> {
        self.players
            .iter()
            .find(|p| p.id == id)
            .ok_or(Error::UnknownPlayer(id))
    }

    #[must_use]
    pub fn armies_for_player(&self, player: PlayerId) -> u32 {
        self.world.armies_for_player(player)
    }

    #[must_use]
    pub fn is_alive(&self, player: PlayerId) -> bool {
        self.world.countries().any(|c| c.is_occupied_by(player))
    }

    /// Игроки, у которых осталась хотя бы одна страна, в порядке хода
    #[must_use]
    pub fn alive_players(&self) -> Vec<&Player> {
        self.players.iter().filter(|p| self.is_alive(p.id)).collect()
    }

    // ── Предикаты ──────────────────────────────────────────────────────

    #[must_use]
    pub fn can_select_player(&self, player: PlayerId) -> bool {
        player != self.current_player && self.player(player).is_ok()
    }

    /// Страну можно выбрать, если она принадлежит текущему игроку
    #[must_use]
    pub fn can_set_country(&self, country: CountryId) -> bool {
        self.world
            .country(country)
            .is_ok_and(|c| c.is_occupied_by(self.current_player))
    }

    #[must_use]
    pub fn can_unset_country(&self, country: CountryId) -> bool {
        self.selected_country == Some(country) && self.can_set_country(country)
    }

    /// Из выбранной страны можно войти в `country` (свободную или чужую)
    #[must_use]
    pub fn can_move_to_country(&self, country: CountryId) -> bool {
        let Some(selected) = self.selected_country else {
            return false;
        };
        let Ok(target) = self.world.country(country) else {
            return false;
        };
        if target.is_occupied_by(self.current_player) {
            return false;
        }
        match target.player {
            None => self.world.can_move(selected, country),
            Some(_) => self.world.can_attack(selected, country),
        }
    }

    #[must_use]
    pub fn can_select_country(&self, country: CountryId) -> bool {
        self.can_move_to_country(country) || self.can_set_country(country)
    }

    // ── Переходы ───────────────────────────────────────────────────────

    /// Щелчок по стране.
    ///
    /// Если из выбранной страны можно войти в `country`, выполняется ход или
    /// атака и выбор сбрасывается. Иначе повторный щелчок по выбранной стране
    /// снимает выбор, а щелчок по своей стране выбирает её. В остальных
    /// случаях состояние не меняется.
    pub fn select_country<R: Rng + ?Sized>(&self, country: CountryId, rng: &mut R) -> Result<Game> {
        let target = self.world.country(country)?;

        if self.can_move_to_country(country) {
            if let Some(source) = self.selected_country {
                return self.move_to_country(source, country, target.player.is_some(), rng);
            }
        }

        if self.can_unset_country(country) {
            return Ok(self.with_selection(None));
        }
        if self.can_set_country(country) {
            return Ok(self.with_selection(Some(country)));
        }
        Ok(self.clone())
    }

    fn move_to_country<R: Rng + ?Sized>(
        &self,
        source: CountryId,
        target: CountryId,
        hostile: bool,
        rng: &mut R,
    ) -> Result<Game> {
        let (world, battle) = if hostile {
            let (world, battle) = self.world.attack(source, target, rng)?;
            (world, Some(battle))
        } else {
            (self.world.move_armies(source, target)?, None)
        };

        Ok(Game {
            world,
            selected_country: None,
            last_battle: battle,
            ..self.clone()
        })
    }

    fn with_selection(&self, selected_country: Option<CountryId>) -> Game {
        Game {
            selected_country,
            ..self.clone()
        }
    }

    /// Следующий живой игрок после текущего по кругу
    fn next_player(&self) -> Result<PlayerId> {
        let position = self
            .players
            .iter()
            .position(|p| p.id == self.current_player)
            .ok_or(Error::UnknownPlayer(self.current_player))?;

        let count = self.players.len();
        (1..=count)
            .map(|step| self.players[(position + step) % count].id)
            .find(|&id| self.is_alive(id))
            .ok_or(Error::SamePlayer(self.current_player))
    }

    /// Конец хода: подкрепления текущему игроку и передача хода следующему живому.
    ///
    /// # Ошибки
    /// `Error::SamePlayer`, если кроме текущего игрока живых не осталось.
    pub fn end_turn(&self) -> Result<Game> {
        let next = self.next_player()?;
        if next == self.current_player {
            return Err(Error::SamePlayer(next));
        }

        let world = self.world.reinforce(self.current_player)?;
        tracing::debug!(
            turn = self.turn,
            from = %self.current_player,
            to = %next,
            "turn ended"
        );

        Ok(Game {
            world,
            current_player: next,
            selected_country: None,
            turn: self.turn + 1,
            ..self.clone()
        })
    }

    // ── Конец игры ─────────────────────────────────────────────────────

    fn alive_count(&self, kind: PlayerKind) -> usize {
        self.alive_players().iter().filter(|p| p.kind == kind).count()
    }

    fn has_kind(&self, kind: PlayerKind) -> bool {
        self.players.iter().any(|p| p.kind == kind)
    }

    /// Партия окончена, когда одна из сторон (люди или компьютеры) потеряла
    /// всех игроков. Если все игроки одного типа — когда жив лишь один.
    #[must_use]
    pub fn is_over(&self) -> bool {
        if self.has_kind(PlayerKind::Human) && self.has_kind(PlayerKind::Computer) {
            self.alive_count(PlayerKind::Human) == 0 || self.alive_count(PlayerKind::Computer) == 0
        } else {
            self.alive_players().len() < 2
        }
    }

    /// Победившая сторона, если партия окончена
    #[must_use]
    pub fn winner(&self) -> Option<PlayerKind> {
        if !self.is_over() {
            return None;
        }
        self.alive_players().first().map(|p| p.kind)
    }
}
