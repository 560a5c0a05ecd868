use iced::widget::image::Handle;
use iced::widget::{button, column, container, image, pick_list, row, text};
use iced::{Alignment, Element, Length, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;
use url::Url;

mod api;
mod logging;
mod state;

use api::{ConvertClient, ConvertError};
use state::{data, ConversionResult, Session, Style};

/// Main application state
struct Illustrator {
    /// Image, style, in-flight flag and result, with the transition rules
    session: Session,
    /// HTTP gateway to the conversion service
    client: ConvertClient,
    /// Status message shown at the bottom of the window
    status: String,
    /// Widget-ready copy of the selected image
    source_preview: Option<Handle>,
    /// Widget-ready copy of the converted image
    result_preview: Option<Handle>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked "Select Image"
    PickImage,
    /// Background file read finished
    ImageLoaded(Result<Vec<u8>, String>),
    /// User chose a style from the pick list
    StyleSelected(Style),
    /// User clicked "Convert"
    Convert,
    /// The conversion request settled
    ConversionFinished(Result<ConversionResult, ConvertError>),
    /// User clicked "Download"
    Download,
    /// Background file write finished
    DownloadFinished(Result<PathBuf, String>),
    /// User clicked "Share"
    Share,
}

impl Illustrator {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        // A misconfigured service URL leaves nothing to talk to, so fail
        // loudly at startup instead of on the first convert.
        let client = ConvertClient::from_env()
            .expect("Invalid ILLUSTRATOR_API_URL. Set a valid http(s) URL or unset it.");

        tracing::info!(page = %client.page_url(), "image illustrator started");

        (
            Illustrator {
                session: Session::new(),
                client,
                status: String::from("Select an image and a style to get started."),
                source_preview: None,
                result_preview: None,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickImage => {
                // Show the native file picker dialog
                let file = FileDialog::new()
                    .set_title("Select an Image")
                    .add_filter("Images", &["jpg", "jpeg", "png"])
                    .pick_file();

                if let Some(path) = file {
                    self.status = format!("Loading {}...", path.display());
                    return Task::perform(read_image_file(path), Message::ImageLoaded);
                }

                Task::none()
            }
            Message::ImageLoaded(Ok(bytes)) => {
                let mime = data::sniff_mime(&bytes);

                match self.session.select_image(bytes, mime) {
                    Ok(()) => {
                        // The session owns the authoritative bytes; the handle
                        // is a display copy refreshed only when they change.
                        if let Some(source) = self.session.source() {
                            tracing::info!(
                                mime = source.media_type.mime(),
                                bytes = source.bytes.len(),
                                "image selected"
                            );
                            self.source_preview = Some(Handle::from_bytes(source.bytes.clone()));
                        }
                        self.result_preview = None;
                        self.status = String::from("Image loaded. Pick a style and convert.");
                    }
                    Err(e) => {
                        tracing::warn!(mime, "rejected file");
                        self.status = format!("Error: {}", e);
                    }
                }

                Task::none()
            }
            Message::ImageLoaded(Err(e)) => {
                tracing::warn!(error = %e, "could not read file");
                self.status = format!("Error: {}", e);
                Task::none()
            }
            Message::StyleSelected(style) => {
                // The pick list only offers known styles, but the session
                // still owns the membership check.
                if let Err(e) = self.session.select_style(style.id()) {
                    self.status = format!("Error: {}", e);
                }
                Task::none()
            }
            Message::Convert => {
                match self.session.begin_conversion() {
                    Ok(request) => {
                        tracing::info!(style = request.style.id(), "conversion started");
                        self.status =
                            format!("Converting with the {} style...", request.style.label());

                        let client = self.client.clone();
                        return Task::perform(
                            async move { client.convert(request).await },
                            Message::ConversionFinished,
                        );
                    }
                    Err(e) => {
                        self.status = format!("Error: {}", e);
                    }
                }

                Task::none()
            }
            Message::ConversionFinished(outcome) => {
                match self.session.finish_conversion(outcome) {
                    Ok(()) => {
                        if let Some(result) = self.session.result() {
                            tracing::info!(bytes = result.bytes.len(), "conversion finished");
                            self.result_preview = Some(Handle::from_bytes(result.bytes.clone()));
                        }
                        self.status =
                            String::from("✅ Done! Download or share your illustration.");
                    }
                    Err(e) => {
                        // The previous result, if any, stays on screen.
                        tracing::warn!(error = %e, "conversion failed");
                        self.status = format!("Error: {}", e);
                    }
                }

                Task::none()
            }
            Message::Download => {
                let (Some(result), Some(file_name)) =
                    (self.session.result(), self.session.download_file_name())
                else {
                    return Task::none();
                };
                let bytes = result.bytes.clone();

                let start_dir = dirs::download_dir()
                    .or_else(dirs::home_dir)
                    .unwrap_or_else(|| PathBuf::from("."));

                // Show the native save dialog, seeded with the generated name
                let target = FileDialog::new()
                    .set_title("Save Illustration")
                    .set_directory(start_dir)
                    .set_file_name(file_name)
                    .save_file();

                if let Some(path) = target {
                    self.status = format!("Saving {}...", path.display());
                    return Task::perform(
                        write_result_file(path, bytes),
                        Message::DownloadFinished,
                    );
                }

                Task::none()
            }
            Message::DownloadFinished(Ok(path)) => {
                tracing::info!(path = %path.display(), "illustration saved");
                self.status = format!("✅ Saved to {}.", path.display());
                Task::none()
            }
            Message::DownloadFinished(Err(e)) => {
                tracing::warn!(error = %e, "could not save illustration");
                self.status = format!("Error: {}", e);
                Task::none()
            }
            Message::Share => {
                let Some(caption) = self.session.share_caption() else {
                    return Task::none();
                };

                let intent = share_intent_url(&caption, &self.client.page_url());
                tracing::info!(url = %intent, "opening share link");

                // Hand the rest of the flow to the browser; nothing to await.
                if let Err(e) = open::that_detached(intent.as_str()) {
                    tracing::warn!(error = %e, "could not open a browser");
                    self.status = String::from("Error: could not open a browser to share.");
                } else {
                    self.status = String::from("Share link opened in your browser.");
                }

                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let header = column![
            text("Image Illustrator").size(36),
            text("Turn a photo into illustration-style artwork").size(16),
        ]
        .spacing(8)
        .align_x(Alignment::Center);

        let panes = row![self.source_pane(), self.result_pane()]
            .spacing(24)
            .height(Length::Fill);

        let content = column![header, panes, text(&self.status).size(16)]
            .spacing(24)
            .padding(32)
            .align_x(Alignment::Center);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }

    /// Left pane: the selected image and the inputs that drive a conversion
    fn source_pane(&self) -> Element<Message> {
        let preview: Element<Message> = match &self.source_preview {
            Some(handle) => image(handle.clone())
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => container(text("Upload an image to get started"))
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into(),
        };

        let convert_label = if self.session.is_processing() {
            "Converting..."
        } else {
            "Convert"
        };

        let controls = column![
            button("Select Image")
                .on_press(Message::PickImage)
                .padding(10),
            pick_list(Style::ALL, self.session.style(), Message::StyleSelected)
                .placeholder("Choose a style"),
            button(text(convert_label))
                .on_press_maybe(self.session.can_convert().then_some(Message::Convert))
                .padding(10),
        ]
        .spacing(12)
        .align_x(Alignment::Center);

        container(
            column![text("Original").size(20), preview, controls]
                .spacing(16)
                .align_x(Alignment::Center),
        )
        .width(Length::FillPortion(1))
        .padding(16)
        .into()
    }

    /// Right pane: the conversion result and what can be done with it
    fn result_pane(&self) -> Element<Message> {
        let placeholder = if self.session.is_processing() {
            "Converting..."
        } else {
            "The converted image will appear here"
        };

        let preview: Element<Message> = match &self.result_preview {
            Some(handle) => image(handle.clone())
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => container(text(placeholder))
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into(),
        };

        let actions = row![
            button("Download")
                .on_press_maybe(self.session.has_result().then_some(Message::Download))
                .padding(10),
            button("Share")
                .on_press_maybe(self.session.has_result().then_some(Message::Share))
                .padding(10),
        ]
        .spacing(12);

        container(
            column![text("Illustration").size(20), preview, actions]
                .spacing(16)
                .align_x(Alignment::Center),
        )
        .width(Length::FillPortion(1))
        .padding(16)
        .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Light
    }
}

fn main() -> iced::Result {
    logging::init();

    iced::application("Image Illustrator", Illustrator::update, Illustrator::view)
        .theme(Illustrator::theme)
        .centered()
        .run_with(Illustrator::new)
}

/// Read the selected file into memory off the UI thread.
async fn read_image_file(path: PathBuf) -> Result<Vec<u8>, String> {
    tokio::fs::read(&path)
        .await
        .map_err(|e| format!("could not read {}: {}", path.display(), e))
}

/// Write the converted bytes where the user chose to save them.
async fn write_result_file(path: PathBuf, bytes: Vec<u8>) -> Result<PathBuf, String> {
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| format!("could not save {}: {}", path.display(), e))?;

    Ok(path)
}

/// Build the tweet intent URL carrying the caption and the page to link back to.
fn share_intent_url(caption: &str, page: &Url) -> Url {
    Url::parse_with_params(
        "https://twitter.com/intent/tweet",
        &[("text", caption), ("url", page.as_str())],
    )
    .expect("the intent base URL is valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_intent_url_carries_caption_and_page() {
        let page = Url::parse("http://localhost:5001/").unwrap();
        let caption = "Turned my photo into Anime! #ImageIllustrator";

        let intent = share_intent_url(caption, &page);

        assert!(intent
            .as_str()
            .starts_with("https://twitter.com/intent/tweet?"));

        let pairs: Vec<(String, String)> = intent.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("text".to_string(), caption.to_string())));
        assert!(pairs.contains(&("url".to_string(), "http://localhost:5001/".to_string())));
    }
}
