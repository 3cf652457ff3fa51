use chanfan::{Broadcaster, MessageStream};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug)]
enum Event {
    Price(&'static str, u32),
    Halt,
}

async fn ticker_listener(name: &'static str, mut stream: MessageStream<Event>) {
    while let Some(event) = stream.recv().await {
        match event {
            Event::Price(symbol, price) => println!("{}: {} = {}", name, symbol, price),
            Event::Halt => println!("{}: trading halted", name),
        }
    }
    println!("{}: stream ended", name);
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let broadcaster = Broadcaster::<Event>::new();
    broadcaster.add_channel("stocks");

    let (stocks, stocks_done, stocks_cancel) = broadcaster
        .register_listener("stocks", 4)
        .expect("stocks channel is registered")
        .into_parts();
    let (audit, audit_done, _) = broadcaster
        .register_listener(broadcaster.default_channel(), 0)
        .expect("default channel always exists")
        .into_parts();
    let stocks_join = tokio::spawn(ticker_listener("stocks", stocks));
    let audit_join = tokio::spawn(ticker_listener("audit", audit));

    broadcaster.send(Event::Price("ACME", 42), ["stocks"]).await;
    broadcaster
        .send_with_default(Event::Price("INITECH", 7), ["stocks"])
        .await;
    broadcaster.publish(Event::Halt).await;

    stocks_cancel.cancel();
    stocks_done.fired().await;

    let default_closed = broadcaster
        .close_notify(broadcaster.default_channel())
        .expect("default channel always exists");
    broadcaster.close_channel(broadcaster.default_channel());
    default_closed.fired().await;
    audit_done.fired().await;

    stocks_join.await.expect("stocks listener panicked");
    audit_join.await.expect("audit listener panicked");
    println!("channels left: {:?}", broadcaster.channels());
}
