use iced::{
    widget::{button, column, row, text, text_input, container, scrollable, slider, Button},
    alignment::Horizontal,
    Alignment, Application, Background, Color, Command, Element, Length, Settings, Subscription,
    Theme, theme, time,
};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use dotenv::dotenv;

mod api;
mod auth;
mod chat;
mod models;
mod music;
mod search;
mod session;

use api::ApiClient;
use auth::{AuthMode, AuthScreen};
use chat::{ChatThread, POLL_INTERVAL};
use models::{ChatMessage, SearchedUser, Session};
use music::{Player, PLAYER_TICK, TRACKS};
use search::{DirectorySearch, SEARCH_DEBOUNCE};
use session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Section {
    #[default]
    Contacts,
    Profile,
    Settings,
    Music,
}

struct MessengerApp {
    api: ApiClient,
    store: Option<SessionStore>,
    session: Option<Session>,
    auth: AuthScreen,
    section: Section,
    search: DirectorySearch,
    chat: Option<ChatThread>,
    player: Player,
    status: String,
    scroll_id: scrollable::Id,
}

#[derive(Clone, Debug)]
enum AppMessage {
    // auth
    AuthModeSwitched(AuthMode),
    LoginEmailChanged(String),
    LoginPasswordChanged(String),
    RegisterEmailChanged(String),
    RegisterUsernameChanged(String),
    RegisterPasswordChanged(String),
    SubmitLogin,
    SubmitRegister,
    AuthSucceeded(Session),
    AuthFailed(String),
    Logout,
    // navigation
    SectionSelected(Section),
    StatusDismissed,
    // directory search
    SearchQueryChanged(String),
    SearchDebounceElapsed(u64),
    SearchLoaded(Vec<SearchedUser>),
    SearchFailed(String),
    // chat
    StartChat(SearchedUser),
    ChatOpened(i64, SearchedUser),
    ChatOpenFailed(String),
    CloseChat,
    PollTick,
    MessagesLoaded(i64, Vec<ChatMessage>),
    MessagesFailed(String),
    DraftChanged(String),
    SendPressed,
    SendSucceeded(i64),
    SendFailed(String),
    // player
    TrackPressed(usize),
    PlayPausePressed,
    NextPressed,
    PreviousPressed,
    SeekChanged(f32),
    VolumeChanged(f32),
    PlayerTick,
}

impl Application for MessengerApp {
    type Executor = iced::executor::Default;
    type Message = AppMessage;
    type Theme = Theme;
    type Flags = ();

    fn new(_flags: ()) -> (Self, Command<AppMessage>) {
        let api = ApiClient::from_env();
        let (store, session) = match SessionStore::open_default() {
            Ok(store) => {
                let session = store.load().unwrap_or_else(|e| {
                    log::warn!("could not read stored session: {}", e);
                    None
                });
                (Some(store), session)
            }
            Err(e) => {
                log::warn!("session store unavailable, running without persistence: {}", e);
                (None, None)
            }
        };
        if let Some(session) = &session {
            log::info!("restored session for {}", session.user.username);
        }

        (
            MessengerApp {
                api,
                store,
                session,
                auth: AuthScreen::new(),
                section: Section::Contacts,
                search: DirectorySearch::new(),
                chat: None,
                player: Player::new(),
                status: String::new(),
                scroll_id: scrollable::Id::new("chat_scroll"),
            },
            Command::none(),
        )
    }

    fn title(&self) -> String {
        String::from("Messenger")
    }

    fn update(&mut self, message: AppMessage) -> Command<AppMessage> {
        match message {
            AppMessage::AuthModeSwitched(mode) => {
                self.auth.mode = mode;
                self.status.clear();
                Command::none()
            }
            AppMessage::LoginEmailChanged(email) => {
                self.auth.login_email = email;
                Command::none()
            }
            AppMessage::LoginPasswordChanged(password) => {
                self.auth.login_password = password;
                Command::none()
            }
            AppMessage::RegisterEmailChanged(email) => {
                self.auth.register_email = email;
                Command::none()
            }
            AppMessage::RegisterUsernameChanged(username) => {
                self.auth.register_username = username;
                Command::none()
            }
            AppMessage::RegisterPasswordChanged(password) => {
                self.auth.register_password = password;
                Command::none()
            }
            AppMessage::SubmitLogin => {
                let email = self.auth.login_email.trim().to_string();
                let password = self.auth.login_password.clone();
                if email.is_empty() || password.is_empty() {
                    self.status = "Email and password are required".to_string();
                    return Command::none();
                }
                let api = self.api.clone();
                Command::perform(
                    async move { api.login(&email, &password).await },
                    |result| match result {
                        Ok(session) => AppMessage::AuthSucceeded(session),
                        Err(e) => AppMessage::AuthFailed(e.to_string()),
                    },
                )
            }
            AppMessage::SubmitRegister => {
                let email = self.auth.register_email.trim().to_string();
                let username = self.auth.register_username.trim().to_string();
                let password = self.auth.register_password.clone();
                if email.is_empty() {
                    self.status = "All fields are required".to_string();
                    return Command::none();
                }
                if let Err(reason) = auth::validate_registration(&username, &password) {
                    self.status = reason;
                    return Command::none();
                }
                let api = self.api.clone();
                Command::perform(
                    async move { api.register(&email, &username, &password).await },
                    |result| match result {
                        Ok(session) => AppMessage::AuthSucceeded(session),
                        Err(e) => AppMessage::AuthFailed(e.to_string()),
                    },
                )
            }
            AppMessage::AuthSucceeded(session) => {
                if let Some(store) = &self.store {
                    if let Err(e) = store.save(&session) {
                        log::warn!("failed to persist session: {}", e);
                    }
                }
                log::info!("authenticated as {}", session.user.username);
                self.status = format!("Welcome, {}!", session.user.username);
                self.session = Some(session);
                self.auth = AuthScreen::new();
                self.section = Section::Contacts;
                Command::none()
            }
            AppMessage::AuthFailed(reason) => {
                self.status = reason;
                Command::none()
            }
            AppMessage::Logout => {
                if let Some(store) = &self.store {
                    if let Err(e) = store.clear() {
                        log::warn!("failed to clear stored session: {}", e);
                    }
                }
                self.session = None;
                self.auth = AuthScreen::new();
                self.search.clear();
                self.chat = None;
                self.player = Player::new();
                self.section = Section::Contacts;
                self.status = "Logged out".to_string();
                Command::none()
            }
            AppMessage::SectionSelected(section) => {
                let resumed = self.section == Section::Music && section != Section::Music;
                self.section = section;
                // the chat pane remounts when coming back from the music view,
                // so its refresh cycle restarts with an immediate fetch
                if resumed {
                    if let Some(chat) = &self.chat {
                        return self.fetch_messages(chat.chat_id);
                    }
                }
                Command::none()
            }
            AppMessage::StatusDismissed => {
                self.status.clear();
                Command::none()
            }
            AppMessage::SearchQueryChanged(query) => match self.search.edit(query) {
                Some(generation) => Command::perform(
                    async move {
                        tokio::time::sleep(SEARCH_DEBOUNCE).await;
                        generation
                    },
                    AppMessage::SearchDebounceElapsed,
                ),
                None => Command::none(),
            },
            AppMessage::SearchDebounceElapsed(generation) => {
                let Some(query) = self.search.settle(generation) else {
                    return Command::none();
                };
                let api = self.api.clone();
                Command::perform(
                    async move { api.search_users(&query).await },
                    |result| match result {
                        Ok(users) => AppMessage::SearchLoaded(users),
                        Err(e) => AppMessage::SearchFailed(e.to_string()),
                    },
                )
            }
            AppMessage::SearchLoaded(users) => {
                self.search.apply_results(users);
                Command::none()
            }
            AppMessage::SearchFailed(reason) => {
                log::warn!("user search failed: {}", reason);
                self.search.fail();
                self.status = "Search failed, try again".to_string();
                Command::none()
            }
            AppMessage::StartChat(user) => {
                let Some(session) = &self.session else {
                    return Command::none();
                };
                let me = session.user.id;
                let api = self.api.clone();
                self.status.clear();
                Command::perform(
                    async move {
                        api.create_or_get_chat(me, user.id)
                            .await
                            .map(|chat_id| (chat_id, user))
                    },
                    |result| match result {
                        Ok((chat_id, user)) => AppMessage::ChatOpened(chat_id, user),
                        Err(e) => AppMessage::ChatOpenFailed(e.to_string()),
                    },
                )
            }
            AppMessage::ChatOpened(chat_id, other_user) => {
                self.chat = Some(ChatThread::new(chat_id, other_user));
                self.fetch_messages(chat_id)
            }
            AppMessage::ChatOpenFailed(reason) => {
                self.status = reason;
                Command::none()
            }
            AppMessage::CloseChat => {
                // dropping the thread is what stops the poll subscription
                self.chat = None;
                Command::none()
            }
            AppMessage::PollTick => match &self.chat {
                Some(chat) => self.fetch_messages(chat.chat_id),
                None => Command::none(),
            },
            AppMessage::MessagesLoaded(chat_id, messages) => {
                let Some(chat) = &mut self.chat else {
                    return Command::none();
                };
                let grew = messages.len() != chat.messages.len();
                if chat.apply_snapshot(chat_id, messages) && grew {
                    return scrollable::snap_to(
                        self.scroll_id.clone(),
                        scrollable::RelativeOffset { x: 0.0, y: 1.0 },
                    );
                }
                Command::none()
            }
            AppMessage::MessagesFailed(reason) => {
                // the poll just tries again on the next tick
                log::warn!("message refresh failed: {}", reason);
                Command::none()
            }
            AppMessage::DraftChanged(draft) => {
                if let Some(chat) = &mut self.chat {
                    chat.draft = draft;
                }
                Command::none()
            }
            AppMessage::SendPressed => {
                let Some(session) = &self.session else {
                    return Command::none();
                };
                let me = session.user.id;
                let Some(chat) = &mut self.chat else {
                    return Command::none();
                };
                let Some(text) = chat.begin_send() else {
                    return Command::none();
                };
                let chat_id = chat.chat_id;
                let api = self.api.clone();
                Command::perform(
                    async move { api.send_message(me, chat_id, &text).await.map(|_| chat_id) },
                    |result| match result {
                        Ok(chat_id) => AppMessage::SendSucceeded(chat_id),
                        Err(e) => AppMessage::SendFailed(e.to_string()),
                    },
                )
            }
            AppMessage::SendSucceeded(chat_id) => {
                let delivered_here = self.chat.as_mut().map_or(false, |chat| {
                    if chat.chat_id == chat_id {
                        chat.finish_send(true);
                        true
                    } else {
                        false
                    }
                });
                if delivered_here {
                    // refresh right away instead of waiting for the next tick
                    self.fetch_messages(chat_id)
                } else {
                    Command::none()
                }
            }
            AppMessage::SendFailed(reason) => {
                if let Some(chat) = &mut self.chat {
                    chat.finish_send(false);
                }
                self.status = reason;
                Command::none()
            }
            AppMessage::TrackPressed(index) => {
                self.player.select(index);
                Command::none()
            }
            AppMessage::PlayPausePressed => {
                self.player.toggle();
                Command::none()
            }
            AppMessage::NextPressed => {
                self.player.next();
                Command::none()
            }
            AppMessage::PreviousPressed => {
                self.player.previous();
                Command::none()
            }
            AppMessage::SeekChanged(position) => {
                self.player.seek(position as u32);
                Command::none()
            }
            AppMessage::VolumeChanged(volume) => {
                self.player.set_volume(volume as u8);
                Command::none()
            }
            AppMessage::PlayerTick => {
                self.player.tick();
                Command::none()
            }
        }
    }

    fn view(&self) -> Element<AppMessage> {
        match &self.session {
            None => self.auth_view(),
            Some(session) => self.main_view(session),
        }
    }

    fn subscription(&self) -> Subscription<AppMessage> {
        let mut subscriptions = Vec::new();
        // the poll lives exactly as long as a chat is selected and its pane
        // is mounted; the music view replaces the pane entirely
        if self.session.is_some() && self.chat.is_some() && self.section != Section::Music {
            subscriptions.push(time::every(POLL_INTERVAL).map(|_| AppMessage::PollTick));
        }
        if self.player.playing {
            subscriptions.push(time::every(PLAYER_TICK).map(|_| AppMessage::PlayerTick));
        }
        Subscription::batch(subscriptions)
    }
}

impl MessengerApp {
    fn fetch_messages(&self, chat_id: i64) -> Command<AppMessage> {
        let Some(session) = &self.session else {
            return Command::none();
        };
        let me = session.user.id;
        let api = self.api.clone();
        Command::perform(
            async move {
                api.get_messages(me, chat_id)
                    .await
                    .map(|messages| (chat_id, messages))
            },
            |result| match result {
                Ok((chat_id, messages)) => AppMessage::MessagesLoaded(chat_id, messages),
                Err(e) => AppMessage::MessagesFailed(e.to_string()),
            },
        )
    }

    fn auth_view(&self) -> Element<AppMessage> {
        let form: Element<AppMessage> = match self.auth.mode {
            AuthMode::Login => {
                let email_input = text_input("Email", &self.auth.login_email)
                    .on_input(AppMessage::LoginEmailChanged)
                    .padding(10)
                    .width(Length::Fixed(300.0))
                    .style(theme::TextInput::Default);
                let password_input = text_input("Password", &self.auth.login_password)
                    .on_input(AppMessage::LoginPasswordChanged)
                    .on_submit(AppMessage::SubmitLogin)
                    .secure(true)
                    .padding(10)
                    .width(Length::Fixed(300.0))
                    .style(theme::TextInput::Default);

                column![
                    email_input,
                    password_input,
                    button("Sign in").on_press(AppMessage::SubmitLogin).padding(10),
                    button("No account? Create one")
                        .on_press(AppMessage::AuthModeSwitched(AuthMode::Register))
                        .style(theme::Button::Text)
                        .padding(10),
                ]
                .spacing(15)
                .align_items(Alignment::Center)
                .into()
            }
            AuthMode::Register => {
                let email_input = text_input("Email", &self.auth.register_email)
                    .on_input(AppMessage::RegisterEmailChanged)
                    .padding(10)
                    .width(Length::Fixed(300.0))
                    .style(theme::TextInput::Default);
                let username_input = text_input("Username", &self.auth.register_username)
                    .on_input(AppMessage::RegisterUsernameChanged)
                    .padding(10)
                    .width(Length::Fixed(300.0))
                    .style(theme::TextInput::Default);
                let password_input = text_input("Password", &self.auth.register_password)
                    .on_input(AppMessage::RegisterPasswordChanged)
                    .on_submit(AppMessage::SubmitRegister)
                    .secure(true)
                    .padding(10)
                    .width(Length::Fixed(300.0))
                    .style(theme::TextInput::Default);

                column![
                    email_input,
                    username_input,
                    password_input,
                    button("Create account")
                        .on_press(AppMessage::SubmitRegister)
                        .padding(10),
                    button("Already registered? Sign in")
                        .on_press(AppMessage::AuthModeSwitched(AuthMode::Login))
                        .style(theme::Button::Text)
                        .padding(10),
                ]
                .spacing(15)
                .align_items(Alignment::Center)
                .into()
            }
        };

        let heading = match self.auth.mode {
            AuthMode::Login => "Sign in",
            AuthMode::Register => "Create an account",
        };

        container(
            column![
                text("Messenger").size(30),
                text(heading).size(20),
                form,
                text(&self.status).size(16).style(Color::from_rgb(0.8, 0.3, 0.3)),
            ]
            .spacing(20)
            .align_items(Alignment::Center),
        )
        .center_x()
        .center_y()
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
    }

    fn main_view<'a>(&'a self, session: &'a Session) -> Element<'a, AppMessage> {
        let rail = self.nav_rail();
        let panel = self.content_panel(session);
        let content: Element<AppMessage> = if self.section == Section::Music {
            self.music_view()
        } else {
            match &self.chat {
                Some(chat) => self.chat_view(session, chat),
                None => idle_placeholder(),
            }
        };

        let mut layout = column![
            row![rail, panel, content].spacing(10).height(Length::Fill),
        ]
        .spacing(10)
        .padding(10);

        if !self.status.is_empty() {
            layout = layout.push(
                row![
                    text(&self.status).size(16),
                    button("x")
                        .on_press(AppMessage::StatusDismissed)
                        .style(theme::Button::Text),
                ]
                .spacing(10)
                .align_items(Alignment::Center),
            );
        }

        container(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn nav_rail(&self) -> Element<AppMessage> {
        let entry = |label: &'static str, section: Section, active: Section| {
            Button::new(text(label).size(16))
                .on_press(AppMessage::SectionSelected(section))
                .style(if section == active {
                    theme::Button::Primary
                } else {
                    theme::Button::Text
                })
                .padding(10)
                .width(Length::Fill)
        };

        column![
            text("M").size(30),
            entry("Contacts", Section::Contacts, self.section),
            entry("Profile", Section::Profile, self.section),
            entry("Settings", Section::Settings, self.section),
            entry("Music", Section::Music, self.section),
            container(
                button("Log out")
                    .on_press(AppMessage::Logout)
                    .style(theme::Button::Destructive)
                    .padding(10)
            )
            .height(Length::Fill)
            .align_y(iced::alignment::Vertical::Bottom),
        ]
        .spacing(10)
        .width(Length::Fixed(120.0))
        .into()
    }

    fn content_panel<'a>(&'a self, session: &'a Session) -> Element<'a, AppMessage> {
        let body: Element<AppMessage> = match self.section {
            Section::Contacts => self.search_panel(),
            Section::Profile => profile_panel(session),
            Section::Settings => settings_panel(),
            Section::Music => column![
                text("Music").size(24),
                text("Your personal collection")
                    .size(14)
                    .style(Color::from_rgb(0.5, 0.5, 0.5)),
            ]
            .spacing(10)
            .padding(10)
            .into(),
        };

        container(body)
            .width(Length::Fixed(280.0))
            .height(Length::Fill)
            .into()
    }

    fn search_panel(&self) -> Element<AppMessage> {
        let query_input = text_input("Search by username", &self.search.query)
            .on_input(AppMessage::SearchQueryChanged)
            .padding(10)
            .style(theme::TextInput::Default);

        let results: Element<AppMessage> = if self.search.searching {
            text("Searching...").size(16).into()
        } else if !self.search.results.is_empty() {
            scrollable(
                column(
                    self.search
                        .results
                        .iter()
                        .map(|user| search_result_row(user))
                        .collect::<Vec<_>>(),
                )
                .spacing(5),
            )
            .into()
        } else if self.search.query.trim().len() >= search::MIN_QUERY_LEN {
            text("No users found").size(16).into()
        } else {
            text("Start typing a username")
                .size(16)
                .style(Color::from_rgb(0.5, 0.5, 0.5))
                .into()
        };

        column![text("Find users").size(24), query_input, results]
            .spacing(10)
            .padding(10)
            .into()
    }

    fn chat_view<'a>(&'a self, session: &'a Session, chat: &'a ChatThread) -> Element<'a, AppMessage> {
        let header = row![
            button("Back").on_press(AppMessage::CloseChat).padding(10),
            text(format!("@{}", chat.other_user.username)).size(24),
            text(if chat.other_user.online { "online" } else { "offline" })
                .size(14)
                .style(Color::from_rgb(0.5, 0.5, 0.5)),
        ]
        .spacing(10)
        .align_items(Alignment::Center);

        let message_display = scrollable(
            column(
                chat.messages
                    .iter()
                    .map(|message| message_bubble(message, session.user.id))
                    .collect::<Vec<_>>(),
            )
            .spacing(10)
            .padding(10)
            .width(Length::Fill),
        )
        .height(Length::Fill)
        .id(self.scroll_id.clone());

        let mut draft_input = text_input("Message", &chat.draft)
            .padding(10)
            .width(Length::Fill)
            .style(theme::TextInput::Default);
        if !chat.sending {
            draft_input = draft_input
                .on_input(AppMessage::DraftChanged)
                .on_submit(AppMessage::SendPressed);
        }

        let send_button = button("Send")
            .on_press_maybe((!chat.sending).then_some(AppMessage::SendPressed))
            .padding(10);

        column![header, message_display, row![draft_input, send_button].spacing(10)]
            .spacing(10)
            .padding(10)
            .width(Length::Fill)
            .into()
    }

    fn music_view(&self) -> Element<AppMessage> {
        let current = self.player.current_index();

        let track_list = scrollable(
            column(
                TRACKS
                    .iter()
                    .enumerate()
                    .map(|(index, track)| {
                        let playing_here = current == Some(index) && self.player.playing;
                        let marker = if playing_here { "||" } else { ">" };
                        Button::new(
                            row![
                                text(marker).size(16),
                                column![
                                    text(track.title).size(16),
                                    text(track.artist)
                                        .size(13)
                                        .style(Color::from_rgb(0.5, 0.5, 0.5)),
                                ]
                                .spacing(2),
                                text(format_duration(track.duration_secs))
                                    .size(13)
                                    .style(Color::from_rgb(0.5, 0.5, 0.5)),
                            ]
                            .spacing(15)
                            .align_items(Alignment::Center),
                        )
                        .on_press(AppMessage::TrackPressed(index))
                        .style(if current == Some(index) {
                            theme::Button::Primary
                        } else {
                            theme::Button::Text
                        })
                        .padding(10)
                        .width(Length::Fill)
                        .into()
                    })
                    .collect::<Vec<_>>(),
            )
            .spacing(5),
        )
        .height(Length::Fill);

        let mut layout = column![text("Music").size(30), track_list]
            .spacing(10)
            .padding(10)
            .width(Length::Fill);

        if let Some(track) = self.player.current_track() {
            let controls = row![
                button("|<").on_press(AppMessage::PreviousPressed).padding(10),
                button(if self.player.playing { "Pause" } else { "Play" })
                    .on_press(AppMessage::PlayPausePressed)
                    .padding(10),
                button(">|").on_press(AppMessage::NextPressed).padding(10),
            ]
            .spacing(10)
            .align_items(Alignment::Center);

            let seek = row![
                text(format_duration(self.player.position_secs)).size(13),
                slider(
                    0.0..=track.duration_secs as f32,
                    self.player.position_secs as f32,
                    AppMessage::SeekChanged,
                )
                .step(1.0),
                text(format_duration(track.duration_secs)).size(13),
            ]
            .spacing(10)
            .align_items(Alignment::Center);

            let volume = row![
                text("Volume").size(13),
                slider(
                    0.0..=music::MAX_VOLUME as f32,
                    self.player.volume as f32,
                    AppMessage::VolumeChanged,
                )
                .step(1.0),
                text(format!("{}%", self.player.volume)).size(13),
            ]
            .spacing(10)
            .align_items(Alignment::Center);

            layout = layout.push(
                column![
                    text(format!("{} - {}", track.artist, track.title)).size(16),
                    controls,
                    seek,
                    volume,
                ]
                .spacing(10)
                .align_items(Alignment::Center)
                .width(Length::Fill),
            );
        }

        layout.into()
    }
}

fn idle_placeholder<'a>() -> Element<'a, AppMessage> {
    container(
        column![
            text("Find someone to chat with").size(24),
            text("Use the search to find users")
                .size(16)
                .style(Color::from_rgb(0.5, 0.5, 0.5)),
        ]
        .spacing(10)
        .align_items(Alignment::Center),
    )
    .center_x()
    .center_y()
    .width(Length::Fill)
    .height(Length::Fill)
    .into()
}

fn search_result_row(user: &SearchedUser) -> Element<AppMessage> {
    let indicator = if user.online {
        text("online").size(12).style(Color::from_rgb(0.2, 0.7, 0.3))
    } else {
        text("offline").size(12).style(Color::from_rgb(0.5, 0.5, 0.5))
    };

    row![
        column![
            row![text(format!("@{}", user.username)).size(16), indicator]
                .spacing(8)
                .align_items(Alignment::Center),
            text(&user.status).size(13).style(Color::from_rgb(0.5, 0.5, 0.5)),
        ]
        .spacing(2)
        .width(Length::Fill),
        button("Message")
            .on_press(AppMessage::StartChat(user.clone()))
            .padding(5),
    ]
    .spacing(10)
    .align_items(Alignment::Center)
    .into()
}

fn message_bubble(message: &ChatMessage, my_id: i64) -> Element<AppMessage> {
    let is_sender = message.sender_id == my_id;

    let message_row = row![
        text(&message.message_text).size(16),
        text(format_timestamp(&message.created_at))
            .size(12)
            .style(Color::from_rgb(0.5, 0.5, 0.5)),
    ]
    .spacing(5)
    .align_items(Alignment::Center);

    container(message_row)
        .padding(10)
        .width(Length::Shrink)
        .max_width(400)
        .style(move |_theme: &Theme| container::Appearance {
            background: Some(Background::Color(if is_sender {
                Color::from_rgb(0.2, 0.6, 1.0)
            } else {
                Color::from_rgb(1.0, 1.0, 1.0)
            })),
            border: iced::Border {
                color: Color::from_rgb(0.7, 0.7, 0.7),
                width: 1.0,
                radius: 8.0.into(),
            },
            ..Default::default()
        })
        .align_x(if is_sender {
            Horizontal::Right
        } else {
            Horizontal::Left
        })
        .into()
}

fn profile_panel(session: &Session) -> Element<'_, AppMessage> {
    let user = &session.user;
    column![
        text("Profile").size(24),
        text(&user.username).size(20),
        text(format!("@{}", user.username))
            .size(14)
            .style(Color::from_rgb(0.5, 0.5, 0.5)),
        text(format!("Email: {}", user.email)).size(14),
        text(format!("Status: {}", user.status)).size(14),
    ]
    .spacing(10)
    .padding(10)
    .into()
}

fn settings_panel<'a>() -> Element<'a, AppMessage> {
    column![
        text("Settings").size(24),
        text("Notifications").size(16),
        text("Privacy").size(16),
        text("Appearance").size(16),
        text("Language").size(16),
    ]
    .spacing(10)
    .padding(10)
    .into()
}

/// Renders a server `created_at` value: today as a clock time, yesterday
/// called out, anything older dated. Unparsable input is shown as-is.
fn format_timestamp(created_at: &str) -> String {
    let parsed = NaiveDateTime::parse_from_str(created_at, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(created_at, "%Y-%m-%d %H:%M:%S"));
    let Ok(naive) = parsed else {
        return created_at.to_string();
    };
    let local_datetime: DateTime<Local> = Utc.from_utc_datetime(&naive).with_timezone(&Local);
    let now = Local::now();
    let today = now.date_naive();
    let message_date = local_datetime.date_naive();

    if message_date == today {
        local_datetime.format("%I:%M %p").to_string()
    } else if (today - message_date).num_days() == 1 {
        format!("Yesterday, {}", local_datetime.format("%I:%M %p"))
    } else {
        local_datetime.format("%b %d, %I:%M %p").to_string()
    }
}

fn format_duration(total_secs: u32) -> String {
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

fn main() -> iced::Result {
    dotenv().ok();
    env_logger::init();
    MessengerApp::run(Settings::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(59), "0:59");
        assert_eq!(format_duration(212), "3:32");
    }

    #[test]
    fn test_format_timestamp_passes_garbage_through() {
        assert_eq!(format_timestamp("not a date"), "not a date");
    }

    #[test]
    fn test_format_timestamp_dates_old_messages() {
        // far enough in the past that timezone shifts cannot make it today
        let rendered = format_timestamp("2020-06-15 12:00:00.000000");
        assert!(rendered.contains("Jun"));
    }

    #[test]
    fn test_format_timestamp_accepts_fractionless_values() {
        let rendered = format_timestamp("2020-06-15 12:00:00");
        assert!(rendered.contains("Jun"));
    }
}
