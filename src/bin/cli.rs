use clap::Parser;
use hexconquest::{Game, Player, PlayerId, WorldGenerationParams, WorldSnapshot, build_world};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

/// Генератор гексагональных карт и стартовых позиций партии
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу в формате TOML
    #[arg(short, long)]
    config: PathBuf,

    /// Путь для сохранения снимка мира (по умолчанию: ./world.json)
    #[arg(short, long, default_value = "world.json")]
    output: PathBuf,

    /// Сид вместо указанного в конфигурации
    #[arg(short, long)]
    seed: Option<u64>,
}

/// Что попадает в JSON: мир и расстановка игроков
#[derive(Serialize)]
struct Dump<'a> {
    seed: u64,
    players: &'a [Player],
    current_player: PlayerId,
    world: WorldSnapshot,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    tracing::info!(config = %cli.config.display(), "loading configuration");
    let mut params = WorldGenerationParams::from_toml_file(&cli.config)?;
    if let Some(seed) = cli.seed {
        params.seed = seed;
    }

    tracing::info!(
        seed = params.seed,
        width = params.width,
        height = params.height,
        "generating world"
    );
    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    let world = build_world(&params, &mut rng)?;
    let game = Game::new(&world, params.players(), &mut rng)?;

    for player in &game.players {
        tracing::info!(
            player = %player.id,
            kind = ?player.kind,
            armies = game.armies_for_player(player.id),
            "player placed"
        );
    }

    let dump = Dump {
        seed: params.seed,
        players: &game.players,
        current_player: game.current_player,
        world: game.world.snapshot(),
    };
    let writer = BufWriter::new(File::create(&cli.output)?);
    serde_json::to_writer_pretty(writer, &dump)?;

    tracing::info!(output = %cli.output.display(), "world snapshot saved");
    Ok(())
}
