//! Built-in sample rows that keep the service useful without a dataset source.

use crate::domain::RawAnimal;

fn row(
  name: &str,
  scientific: &str,
  habitat: &str,
  diet: &str,
  status: &str,
  predators: &str,
) -> RawAnimal {
  RawAnimal {
    name: name.into(),
    scientific_name: Some(scientific.into()),
    habitat: Some(habitat.into()),
    diet: Some(diet.into()),
    description: None,
    conservation_status: Some(status.into()),
    predators: if predators.is_empty() { None } else { Some(predators.into()) },
    extra: Default::default(),
  }
}

/// Small, cross-referencing set: predators of one row are animals of another.
pub fn seed_animals() -> Vec<RawAnimal> {
  vec![
    row("Lion", "Panthera leo", "Savanna", "Carnivore", "Vulnerable", "Humans"),
    row("Tiger", "Panthera tigris", "Forest", "Carnivore", "Endangered", "Humans"),
    row("Gray Wolf", "Canis lupus", "Forest", "Carnivore", "Least Concern", "Tigers, Humans"),
    row("Zebra", "Equus quagga", "Savanna", "Herbivore", "Near Threatened", "Lions, Hyenas; Crocodiles"),
    row("Spotted Hyena", "Crocuta crocuta", "Savanna", "Carnivore", "Least Concern", "Lions"),
    row("Nile Crocodile", "Crocodylus niloticus", "Rivers", "Carnivore", "Least Concern", ""),
    row("Red Deer", "Cervus elaphus", "Forest", "Herbivore", "Least Concern", "Wolves, Lions"),
    row("Bald Eagle", "Haliaeetus leucocephalus", "Wetlands", "Carnivore", "Least Concern", ""),
    row("Snowshoe Hare", "Lepus americanus", "Tundra", "Herbivore", "Least Concern", "Eagles, Gray Wolf"),
    row("Sumatran Orangutan", "Pongo abelii", "Rainforest", "Omnivore", "Critically Endangered", "Tigers"),
    row("Dodo", "Raphus cucullatus", "Forest", "Herbivore", "Extinct", "Humans"),
  ]
}
