mod resource_pool;
mod scenario_spec;
