fn main() {
    hydra_emit_build::hydra_metadata! {
        @registry_name "event_metadata",
        package "events": {
            "@vocab": "http://schema.org/",
            "@terms": [
                {"define": "ex", "as": "http://example.org/events#"}
            ],
        },
        class "crate::events::Event": {
            "@package": "events",
            "@term": {"define": "startDate", "as": "http://schema.org/startDate"},
            "@fields": {"name": "eventName", "startDate": null, "location": null},
        },
        class "crate::events::Place": {
            "@package": "events",
            "@expose": "PostalAddress",
            "@fields": {"street": "streetAddress", "city": "addressLocality"},
        },
        mixin "crate::events::FestivalMixin" for "crate::events::Event": {
            "@expose": "Festival",
        },
    }
}
