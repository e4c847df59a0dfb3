//! Screen flow of the app without any rendering.
//!
//! The welcome screen offers either profile creation or the profile
//! detail, depending on whether a profile was filled in, and always
//! offers the hike search. Profile creation works on a [`ProfileForm`]
//! draft which only reaches storage on submit.

use std::path::Path;

use image::DynamicImage;

use crate::storage::KeyValueStorage;
use crate::{photo, Profile, ProfileStore, Result};

pub const FIND_BUDDY_HEADLINE: &str = "Find a Hiking Buddy";

#[derive(Eq, PartialEq, Clone, Copy, Debug)]
pub enum Screen {
    Welcome,
    CreateProfile,
    ProfileDetail,
    FindBuddy,
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Welcome => "Welcome to\nTrailing Ahead",
            Screen::CreateProfile => "Create Profile",
            Screen::ProfileDetail => "Profile",
            Screen::FindBuddy => "Find Buddy",
        }
    }
}

#[derive(Eq, PartialEq, Clone, Copy, Debug)]
pub enum WelcomeAction {
    CreateProfile,
    ViewProfile,
    FindHike,
}

impl WelcomeAction {
    pub fn label(&self) -> &'static str {
        match self {
            WelcomeAction::CreateProfile => "Create Profile",
            WelcomeAction::ViewProfile => "View Profile",
            WelcomeAction::FindHike => "Find a Hike",
        }
    }

    pub fn target(&self) -> Screen {
        match self {
            WelcomeAction::CreateProfile => Screen::CreateProfile,
            WelcomeAction::ViewProfile => Screen::ProfileDetail,
            WelcomeAction::FindHike => Screen::FindBuddy,
        }
    }
}

/// The profile entry offered on the welcome screen.
pub fn welcome_action(profile: &Profile) -> WelcomeAction {
    if profile.is_empty() {
        WelcomeAction::CreateProfile
    } else {
        WelcomeAction::ViewProfile
    }
}

/// Actions of the welcome screen, in display order.
pub fn welcome_actions(profile: &Profile) -> [WelcomeAction; 2] {
    [welcome_action(profile), WelcomeAction::FindHike]
}

/// Draft edited on the profile creation screen.
#[derive(Clone, Debug, Default)]
pub struct ProfileForm {
    pub name: String,
    pub location: String,
    pub interests: String,
    photo: Option<DynamicImage>,
}

impl ProfileForm {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            name: profile.name.clone(),
            location: profile.location.clone(),
            interests: profile.interests.clone(),
            photo: profile.photo(),
        }
    }

    pub fn photo(&self) -> Option<&DynamicImage> {
        self.photo.as_ref()
    }

    pub fn select_photo(&mut self, image: DynamicImage) {
        self.photo = Some(image);
    }

    /// Pick a photo from the local file system.
    /// The current selection is kept if the file cannot be read.
    pub fn select_photo_from<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.photo = Some(photo::open(path)?);
        Ok(())
    }

    pub fn clear_photo(&mut self) {
        self.photo = None;
    }

    /// Replace every field of the stored profile with the draft
    /// and save it. Returns the profile as it was saved.
    pub fn submit<S: KeyValueStorage>(self, store: &mut ProfileStore<S>) -> Profile {
        let mut profile = Profile::new(&self.name, &self.location, &self.interests);
        profile.set_photo(self.photo.as_ref());
        store.save(&profile);
        profile
    }

    /// Leave the form without touching the stored profile.
    pub fn cancel(self) {
        log::debug!("profile form cancelled");
    }
}
