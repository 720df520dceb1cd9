//! A protocol client that plays with random placements and random attacks.

use log::debug;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::engine::config::{HEIGHT, PIECE_COUNT, WIDTH};
use crate::protocol::{decode, encode_action, ClientMessage, ServerMessage};
use crate::transport::Transport;

/// How a bot's game finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotOutcome {
    Won,
    Lost,
    OpponentLeft,
}

/// Plays one game over a transport, choosing cells uniformly at random.
pub struct RandomBot<T: Transport> {
    transport: T,
    targets: Vec<(usize, usize)>,
    attacks: usize,
}

fn all_cells() -> Vec<(usize, usize)> {
    (0..HEIGHT)
        .flat_map(|y| (0..WIDTH).map(move |x| (x, y)))
        .collect()
}

impl<T: Transport> RandomBot<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            targets: Vec::new(),
            attacks: 0,
        }
    }

    /// Attacks sent so far.
    pub fn attacks(&self) -> usize {
        self.attacks
    }

    async fn send(&mut self, msg: ClientMessage) -> anyhow::Result<()> {
        let frame = encode_action(&msg)?;
        self.transport.send(&frame).await
    }

    async fn next_message(&mut self) -> anyhow::Result<ServerMessage> {
        match self.transport.recv().await? {
            Some(frame) => decode(&frame),
            None => Err(anyhow::anyhow!("Connection closed before the game finished")),
        }
    }

    async fn fire(&mut self) -> anyhow::Result<()> {
        let (x, y) = self
            .targets
            .pop()
            .ok_or_else(|| anyhow::anyhow!("No cells left to attack"))?;
        self.attacks += 1;
        self.send(ClientMessage::attack(x, y)).await
    }

    /// Play until the game ends or the opponent leaves.
    pub async fn run(&mut self, rng: &mut SmallRng) -> anyhow::Result<BotOutcome> {
        let mut placements = all_cells();
        placements.shuffle(rng);
        self.targets = all_cells();
        self.targets.shuffle(rng);

        loop {
            match self.next_message().await? {
                ServerMessage::WaitingStart => debug!("bot waiting for an opponent"),
                ServerMessage::Match => {
                    for &(x, y) in placements.iter().take(PIECE_COUNT) {
                        self.send(ClientMessage::place(x, y)).await?;
                    }
                }
                ServerMessage::Placed { .. } => {}
                ServerMessage::Duplicate { x, y } => {
                    return Err(anyhow::anyhow!("Server reported duplicate at ({}, {})", x, y));
                }
                ServerMessage::Start { your_turn } => {
                    if your_turn {
                        self.fire().await?;
                    }
                }
                ServerMessage::Attack { own, end, .. } => match (own, end) {
                    (false, true) => return Ok(BotOutcome::Won),
                    (true, true) => return Ok(BotOutcome::Lost),
                    (true, false) => self.fire().await?,
                    (false, false) => {}
                },
                ServerMessage::OpponentDisconnected => return Ok(BotOutcome::OpponentLeft),
                ServerMessage::Error { message } => {
                    return Err(anyhow::anyhow!("Server rejected move: {}", message));
                }
            }
        }
    }
}

/// Result of a bot-versus-bot game on an in-process server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchReport {
    pub first: (BotOutcome, usize),
    pub second: (BotOutcome, usize),
}

impl MatchReport {
    /// 1 or 2 for the winning bot, `None` if neither won.
    pub fn winner(&self) -> Option<u8> {
        match (self.first.0, self.second.0) {
            (BotOutcome::Won, BotOutcome::Lost) => Some(1),
            (BotOutcome::Lost, BotOutcome::Won) => Some(2),
            _ => None,
        }
    }
}

/// Play two seeded bots against each other through a fresh in-process server.
pub async fn local_match(seed1: u64, seed2: u64) -> anyhow::Result<MatchReport> {
    use rand::SeedableRng;

    use crate::server::Server;
    use crate::transport::in_memory::InMemoryTransport;

    let server = Server::new();
    let handle = server.handle();
    let server_task = tokio::spawn(server.run());

    // Attach in order so the first bot is queued first and moves first.
    let (server_side1, client1) = InMemoryTransport::pair();
    handle.attach(server_side1)?;
    let (server_side2, client2) = InMemoryTransport::pair();
    handle.attach(server_side2)?;

    let mut rng1 = SmallRng::seed_from_u64(seed1);
    let mut rng2 = SmallRng::seed_from_u64(seed2);
    let mut bot1 = RandomBot::new(client1);
    let mut bot2 = RandomBot::new(client2);

    let result = tokio::try_join!(
        async { bot1.run(&mut rng1).await },
        async { bot2.run(&mut rng2).await },
    );
    server_task.abort();
    let (outcome1, outcome2) = result?;

    Ok(MatchReport {
        first: (outcome1, bot1.attacks()),
        second: (outcome2, bot2.attacks()),
    })
}
