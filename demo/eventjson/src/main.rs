use hydra_emit::{Hydra, HydraError, HydraSerializer};
use tracing_subscriber::EnvFilter;

mod events {
    use hydra_emit::Hydra;
    use serde::Serialize;

    #[derive(Serialize)]
    pub struct Place {
        pub street: String,
        pub city: String,
    }

    /// A scheduled event. The registered mixin exposes it as a `Festival`.
    #[derive(Serialize)]
    pub struct Event {
        pub name: String,
        #[serde(rename = "startDate")]
        pub start_date: String,
        pub location: Hydra<Place>,
    }

    pub struct FestivalMixin;
}

mod generated {
    hydra_emit::include_hydra!("event_metadata");
}

fn main() -> Result<(), HydraError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let registry = hydra_emit::install(generated::registry())?;
    tracing::info!(?registry, "event metadata installed");

    let event = events::Event {
        name: "Harvest Fair".to_string(),
        start_date: "2026-09-12T10:00:00Z".to_string(),
        location: Hydra(events::Place {
            street: "1 Orchard Lane".to_string(),
            city: "Appleton".to_string(),
        }),
    };

    let event_type = hydra_emit::type_name_of::<events::Event>(registry);
    let document = hydra_emit::to_string_pretty(registry, &event)?;
    tracing::info!(bean_type = event_type, bytes = document.len(), "serialized event");
    println!("=== {} ===", event_type);
    println!("{}", document);

    let place = events::Place {
        street: "2 Mill Road".to_string(),
        city: "Appleton".to_string(),
    };

    println!("\n=== {} (array form) ===", hydra_emit::type_name_of::<events::Place>(registry));
    let array = HydraSerializer::new(registry).as_array_serializer();
    println!("{}", array.to_string(&place)?);

    Ok(())
}
