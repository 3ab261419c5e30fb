//! Titles of the products DREAMM installs, keyed by install folder ID.

/// Static metadata for a product DREAMM can install.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductMeta {
    /// Directory name under the install root, e.g. `lec-dott`.
    pub folder_id: &'static str,
    pub title: &'static str,
}

pub const KNOWN_PRODUCTS: &[ProductMeta] = &[
    ProductMeta { folder_id: "lec-alife", title: "Afterlife" },
    ProductMeta { folder_id: "lec-battlehawks", title: "Battlehawks: 1942" },
    ProductMeta { folder_id: "lec-behindmagic", title: "Star Wars: Behind the Magic" },
    ProductMeta { folder_id: "lec-bensgame", title: "Ben's Game" },
    ProductMeta { folder_id: "lec-comi", title: "Curse of Monkey Island" },
    ProductMeta { folder_id: "lec-darkforces", title: "Star Wars: Dark Forces" },
    ProductMeta { folder_id: "lec-dott", title: "Day of the Tentacle" },
    ProductMeta { folder_id: "lec-efmi", title: "Escape from Monkey Island" },
    ProductMeta { folder_id: "lec-ep1insider", title: "Star Wars: Episode I Insider's Guide" },
    ProductMeta { folder_id: "lec-finest", title: "Their Finest Hour: Battle of Britain" },
    ProductMeta { folder_id: "lec-grim", title: "Grim Fandango" },
    ProductMeta { folder_id: "lec-indy3", title: "Indiana Jones and the Last Crusade" },
    ProductMeta { folder_id: "lec-indy3-action", title: "Indiana Jones and the Last Crusade: The Action Game" },
    ProductMeta { folder_id: "lec-indy4", title: "Indiana Jones and the Fate of Atlantis" },
    ProductMeta { folder_id: "lec-indy4-action", title: "Indiana Jones and the Fate of Atlantis: The Action Game" },
    ProductMeta { folder_id: "lec-indydesk", title: "Indiana Jones and His Desktop Adventures" },
    ProductMeta { folder_id: "lec-infernal", title: "Indiana Jones and the Infernal Machine" },
    ProductMeta { folder_id: "lec-jedi", title: "Star Wars: Jedi Knight" },
    ProductMeta { folder_id: "lec-loom", title: "Loom" },
    ProductMeta { folder_id: "lec-makingmagic", title: "Star Wars: Making Magic" },
    ProductMeta { folder_id: "lec-maniac", title: "Maniac Mansion" },
    ProductMeta { folder_id: "lec-masterblazer", title: "Masterblazer" },
    ProductMeta { folder_id: "lec-monkey2", title: "Monkey Island 2: LeChuck's Revenge" },
    ProductMeta { folder_id: "lec-mortimer", title: "Mortimer and the Riddles of the Medallion" },
    ProductMeta { folder_id: "lec-mots", title: "Star Wars: Jedi Knight: Mysteries of the Sith" },
    ProductMeta { folder_id: "lec-nightshift", title: "Night Shift" },
    ProductMeta { folder_id: "lec-outlaws", title: "Outlaws" },
    ProductMeta { folder_id: "lec-passport", title: "Passport to Adventure" },
    ProductMeta { folder_id: "lec-phantom", title: "Star Wars: Episode I The Phantom Menace" },
    ProductMeta { folder_id: "lec-phmpegasus", title: "PHM Pegasus" },
    ProductMeta { folder_id: "lec-pipedream", title: "Pipe Dream" },
    ProductMeta { folder_id: "lec-racer", title: "Star Wars: Episode I Racer" },
    ProductMeta { folder_id: "lec-rebelassault", title: "Star Wars: Rebel Assault" },
    ProductMeta { folder_id: "lec-rebel2", title: "Star Wars: Rebel Assault II" },
    ProductMeta { folder_id: "lec-rebellion", title: "Star Wars: Rebellion" },
    ProductMeta { folder_id: "lec-roguesq", title: "Star Wars: Rogue Squadron" },
    ProductMeta { folder_id: "lec-samnmax", title: "Sam & Max Hit the Road" },
    ProductMeta { folder_id: "lec-shadows", title: "Star Wars: Shadows of the Empire" },
    ProductMeta { folder_id: "lec-somi", title: "The Secret of Monkey Island" },
    ProductMeta { folder_id: "lec-sswproto", title: "Super Star Wars (Prototype)" },
    ProductMeta { folder_id: "lec-strikefleet", title: "Strike Fleet" },
    ProductMeta { folder_id: "lec-swotl", title: "Secret Weapons of the Luftwaffe" },
    ProductMeta { folder_id: "lec-swse", title: "Star Wars: Screen Entertainment" },
    ProductMeta { folder_id: "lec-thedig", title: "The Dig" },
    ProductMeta { folder_id: "lec-throttle", title: "Full Throttle" },
    ProductMeta { folder_id: "lec-tie", title: "Star Wars: TIE Fighter" },
    ProductMeta { folder_id: "lec-xvt", title: "Star Wars: X-Wing vs. TIE Fighter" },
    ProductMeta { folder_id: "lec-xwa", title: "Star Wars: X-Wing Alliance" },
    ProductMeta { folder_id: "lec-xwing", title: "Star Wars: X-Wing" },
    ProductMeta { folder_id: "lec-yoda", title: "Yoda Stories" },
    ProductMeta { folder_id: "lec-zak", title: "Zak McKracken and the Alien Mindbenders" },
    ProductMeta { folder_id: "lll-anakin", title: "Star Wars: Anakin's Speedway" },
    ProductMeta { folder_id: "lll-droidworks", title: "Star Wars: DroidWorks" },
    ProductMeta { folder_id: "lll-elac", title: "Star Wars: Early Learning Activity Center" },
    ProductMeta { folder_id: "lll-gungan", title: "Star Wars: Episode I The Gungan Frontier" },
    ProductMeta { folder_id: "lll-jarjar", title: "Star Wars: Jar Jar's Journey" },
    ProductMeta { folder_id: "lll-pitdroids", title: "Star Wars: Pit Droids" },
    ProductMeta { folder_id: "lll-swmath", title: "Star Wars Math: Jabba's Game Galaxy" },
    ProductMeta { folder_id: "lll-yoda", title: "Star Wars: Yoda's Challenge Activity Center" },
    ProductMeta { folder_id: "mind-indy2", title: "Indiana Jones and the Temple of Doom" },
    ProductMeta { folder_id: "mind-willow", title: "Willow" },
    ProductMeta { folder_id: "swt-swchess", title: "Star Wars Chess" },
];

/// Display title for a folder ID, if it is a known product.
pub fn title_for(folder_id: &str) -> Option<&'static str> {
    KNOWN_PRODUCTS
        .iter()
        .find(|p| p.folder_id == folder_id)
        .map(|p| p.title)
}
