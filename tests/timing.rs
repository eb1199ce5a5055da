use std::time::{Duration, Instant};

use color_eyre::Result;
use common::{open_quiet, receive};

mod common;

#[tokio::test]
async fn delay_is_respected() -> Result<()> {
    let delay = Duration::from_millis(50);
    let (mut simulator, mut responses) =
        open_quiet("loopback://grbl", delay.as_millis() as i64).await?;

    for _ in 0..3 {
        let start = Instant::now();
        simulator.send("G0 X1\n")?;
        receive(&mut responses).await?;

        assert!(start.elapsed() >= delay, "{:?}", start.elapsed());
    }

    simulator.close().await;

    Ok(())
}

#[tokio::test]
async fn delays_accumulate_per_command() -> Result<()> {
    let delay = Duration::from_millis(20);
    let (mut simulator, mut responses) =
        open_quiet("loopback://echo", delay.as_millis() as i64).await?;

    let start = Instant::now();
    for i in 0..5 {
        simulator.send(format!("{i}\n"))?;
    }
    for _ in 0..5 {
        receive(&mut responses).await?;
    }

    assert!(start.elapsed() >= delay * 5, "{:?}", start.elapsed());

    simulator.close().await;

    Ok(())
}

#[tokio::test]
async fn zero_delay_is_fast() -> Result<()> {
    let (mut simulator, mut responses) = open_quiet("loopback://tinyg", 0).await?;

    let start = Instant::now();
    simulator.send("?\n")?;
    receive(&mut responses).await?;

    assert!(
        start.elapsed() < Duration::from_millis(50),
        "{:?}",
        start.elapsed()
    );

    simulator.close().await;

    Ok(())
}

#[tokio::test]
async fn negative_delay_is_zero() -> Result<()> {
    let (mut simulator, _responses) = open_quiet("loopback://echo", -1000).await?;

    assert!(simulator.settings().response_delay.is_zero());

    simulator.close().await;

    Ok(())
}
