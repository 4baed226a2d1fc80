// The coordinator stores matches under the display name, not the file name.
pub static MAP_DISPLAY_NAMES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "de_inferno" => "Inferno",
    "de_train" => "Train",
    "de_mirage" => "Mirage",
    "de_nuke" => "Nuke",
    "de_overpass" => "Overpass",
    "de_dust2" => "Dust II",
    "de_vertigo" => "Vertigo",
    "de_cache" => "Cache",
    "de_cobblestone" => "Cobblestone",
    "de_canals" => "Canals",
    "de_zoo" => "Zoo",
    "de_abbey" => "Abbey",
    "de_biome" => "Biome",
    "cs_militia" => "Militia",
    "cs_agency" => "Agency",
    "cs_office" => "Office",
    "cs_italy" => "Italy",
    "cs_assault" => "Assault",
    "de_ancient" => "Ancient",
    "de_anubis" => "Anubis",
};

/// Display name of a map, or the raw identifier for maps we don't know.
pub fn display_name(map: &str) -> &str {
    MAP_DISPLAY_NAMES.get(map).copied().unwrap_or(map)
}
