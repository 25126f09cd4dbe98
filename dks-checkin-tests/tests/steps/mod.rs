mod navigation_steps;
mod redemption_steps;
