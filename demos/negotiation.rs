use std::sync::Arc;

use mailroom_convert::{
    CONTENT_TYPE, CompositeMessageConverter, ConversionLayer, Converter, ConverterSettings,
    Envelope, Message, MessageConverter, MessageConverterExt, MessageHeaders, MimeType, StringCodec,
};
use tower::{Layer, ServiceExt, service_fn};
use tracing_error::ErrorLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() {
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(EnvFilter::from_default_env())
        .with(ErrorLayer::default())
        .init();

    let settings: ConverterSettings = serde_json::from_str(
        r#"{ "supported_mime_types": ["text/plain", "application/json"], "serialized_form": "text" }"#,
    )
    .unwrap();
    let text = Converter::from_settings(StringCodec, settings).unwrap();

    let converter: Arc<dyn MessageConverter> = Arc::new(
        CompositeMessageConverter::default()
            .with(Converter::byte_array())
            .with(text),
    );

    let sink = service_fn(|message: Message| async move {
        tracing::info!(
            content_type = ?message.headers.get(CONTENT_TYPE),
            "Message ready for delivery",
        );
        Ok::<_, tower::BoxError>(message)
    });
    let service = ConversionLayer::from_shared(Arc::clone(&converter)).layer(sink);

    let json: MessageHeaders = [(CONTENT_TYPE, "application/json")]
        .into_iter()
        .collect();
    let message = service
        .clone()
        .oneshot(Envelope {
            headers: json,
            message: r#"{"greeting":"hello"}"#.to_owned(),
        })
        .await
        .unwrap();

    let decoded: Option<String> = converter.from_message_as(&message).unwrap();
    tracing::info!(?decoded, "Decoded message payload");

    if let Err(error) = service
        .oneshot(Envelope {
            headers: MessageHeaders::default(),
            message: 3.5f64,
        })
        .await
    {
        tracing::warn!(%error, "Payload could not be converted");
    }

    let empty: [MimeType; 0] = [];
    if let Err(error) = Converter::with_supported_mime_types(StringCodec, empty)
        .with_strict_content_type_match(true)
    {
        tracing::warn!(%error, "Rejected configuration");
    }
}
